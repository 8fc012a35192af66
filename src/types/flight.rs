use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// A company flight as reported by the OnAir public API.
///
/// Only `Id` is required. Any other field that is missing or null falls back
/// to its default, so one incomplete entry can't fail the whole poll.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Flight {
    pub id: Uuid,
    #[serde(default, deserialize_with = "null_as_default")]
    pub registered: bool,
    /// Completion time. Absent while a flight is still in progress.
    #[serde(default, deserialize_with = "onair_time::deserialize")]
    pub engine_off_real_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub result_comments: Option<String>,
    #[serde(default)]
    pub departure_airport: Option<Airport>,
    #[serde(default)]
    pub arrival_actual_airport: Option<Airport>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: Company,
    #[serde(rename = "XPMissions", default, deserialize_with = "null_as_default")]
    pub xp_missions: i64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Airport {
    #[serde(rename = "ICAO", default, deserialize_with = "null_as_default")]
    pub icao: String,
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Company {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub airline_code: String,
}

impl Flight {
    pub fn narrative(&self) -> &str {
        self.result_comments.as_deref().unwrap_or_default()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// OnAir sends timestamps both with and without an offset. Offset-less values are UTC.
mod onair_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };

        if let Ok(time) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(Some(time.with_timezone(&Utc)));
        }

        raw.parse::<NaiveDateTime>()
            .map(|naive| Some(naive.and_utc()))
            .map_err(|e| D::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
    }
}
