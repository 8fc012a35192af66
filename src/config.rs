use std::str::FromStr;

use apalis::cron::Schedule;
use reqwest::Url;
use shuttle_runtime::SecretStore;
use uuid::Uuid;

use crate::{cursor::CursorLocation, error::ConfigError};

pub const DEFAULT_ONAIR_API_URL: &str = "https://server1.onair.company";
pub const DEFAULT_POLL_SCHEDULE: &str = "0 * * * * *";

/// Everything a poll run needs, read once at startup.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub company_id: Uuid,
    pub api_key: String,
    pub api_url: Url,
    /// How many of the company's most recent flights each run requests.
    pub poll_size: u32,
    pub cursor_location: CursorLocation,
    pub webhook_url: Url,
    pub schedule: Schedule,
}

impl PollConfig {
    pub fn from_secrets(secrets: &SecretStore) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| secrets.get(key))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let company_id: Uuid = parse("ONAIR_COMPANY_ID", &require("ONAIR_COMPANY_ID")?)?;
        let api_key = require("ONAIR_API_KEY")?;

        let poll_size: u32 = parse("NUM_FLIGHTS_TO_POLL", &require("NUM_FLIGHTS_TO_POLL")?)?;
        if poll_size == 0 {
            return Err(ConfigError::Invalid {
                key: "NUM_FLIGHTS_TO_POLL",
                reason: "must be at least 1".to_string(),
            });
        }

        let cursor_location: CursorLocation = parse(
            "LAST_FLIGHT_ID_PROCESSED_URI",
            &require("LAST_FLIGHT_ID_PROCESSED_URI")?,
        )?;
        let webhook_url: Url = parse("DISCORD_WEBHOOK_URI", &require("DISCORD_WEBHOOK_URI")?)?;

        let api_url: Url = parse(
            "ONAIR_API_BASE_URL",
            &get("ONAIR_API_BASE_URL").unwrap_or_else(|| DEFAULT_ONAIR_API_URL.to_string()),
        )?;
        let schedule: Schedule = parse(
            "POLL_SCHEDULE",
            &get("POLL_SCHEDULE").unwrap_or_else(|| DEFAULT_POLL_SCHEDULE.to_string()),
        )?;

        Ok(Self {
            company_id,
            api_key,
            api_url,
            poll_size,
            cursor_location,
            webhook_url,
            schedule,
        })
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}
