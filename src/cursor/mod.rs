use std::{fmt, str::FromStr};

use reqwest::Url;
use shuttle_runtime::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StorageError;

mod blob;
mod postgres;

pub use blob::BlobCursorStore;
pub use postgres::PgCursorStore;

/// Persists the id of the most recently notified flight between runs.
#[async_trait]
pub trait CursorStore: Send + Sync {
    async fn read(&self) -> Result<Uuid, StorageError>;

    async fn write(&self, flight_id: Uuid) -> Result<(), StorageError>;
}

/// Where the cursor lives: a blob addressed by a (SAS) URL, or a named row
/// in the service database written as `db:<name>`.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorLocation {
    Blob(Url),
    Database(String),
}

impl CursorLocation {
    pub fn open(&self, pool: &PgPool) -> Box<dyn CursorStore> {
        match self {
            CursorLocation::Blob(url) => Box::new(BlobCursorStore::new(url.clone())),
            CursorLocation::Database(name) => Box::new(PgCursorStore::new(pool.clone(), name)),
        }
    }
}

impl FromStr for CursorLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix("db:") {
            let name = name.trim();
            if name.is_empty() {
                return Err("database cursor needs a name, e.g. db:last-flight".to_string());
            }
            return Ok(CursorLocation::Database(name.to_string()));
        }

        let url = Url::parse(s).map_err(|e| e.to_string())?;
        match url.scheme() {
            "http" | "https" => Ok(CursorLocation::Blob(url)),
            scheme => Err(format!("unsupported cursor scheme {scheme:?}")),
        }
    }
}

/// Never prints the query string, which carries the blob's access signature.
impl fmt::Display for CursorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorLocation::Blob(url) => {
                let mut url = url.clone();
                url.set_query(None);
                write!(f, "{url}")
            }
            CursorLocation::Database(name) => write!(f, "db:{name}"),
        }
    }
}

/// Stored cursors are the plain hyphenated id, possibly with whitespace or a BOM around it.
pub(crate) fn parse_cursor(raw: &str) -> Result<Uuid, StorageError> {
    let value = raw.trim_start_matches('\u{feff}').trim();
    if value.is_empty() {
        return Err(StorageError::Empty);
    }

    Uuid::parse_str(value).map_err(|source| StorageError::InvalidCursor {
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cursor_trims() {
        let id = parse_cursor("\u{feff}7d8f3c2e-1b4a-4c6d-9e0f-112233445566\r\n").unwrap();
        assert_eq!(id.to_string(), "7d8f3c2e-1b4a-4c6d-9e0f-112233445566");
    }

    #[test]
    fn test_parse_cursor_rejects_garbage() {
        assert!(matches!(parse_cursor(""), Err(StorageError::Empty)));
        assert!(matches!(
            parse_cursor("not-a-flight"),
            Err(StorageError::InvalidCursor { ref value, .. }) if value == "not-a-flight"
        ));
    }

    #[test]
    fn test_location_from_str() {
        let blob: CursorLocation = "https://acct.blob.core.windows.net/state/last.txt?sig=s3cr3t"
            .parse()
            .unwrap();
        assert!(matches!(blob, CursorLocation::Blob(_)));

        let db: CursorLocation = "db:handfield".parse().unwrap();
        assert_eq!(db, CursorLocation::Database("handfield".to_string()));

        assert!("db:".parse::<CursorLocation>().is_err());
        assert!("ftp://example.com/last.txt".parse::<CursorLocation>().is_err());
        assert!("last.txt".parse::<CursorLocation>().is_err());
    }

    #[test]
    fn test_location_display_hides_signature() {
        let blob: CursorLocation = "https://acct.blob.core.windows.net/state/last.txt?sig=s3cr3t"
            .parse()
            .unwrap();

        assert_eq!(
            blob.to_string(),
            "https://acct.blob.core.windows.net/state/last.txt"
        );
    }

    #[test]
    fn test_location_display_keeps_port() {
        let blob: CursorLocation =
            "http://127.0.0.1:10000/devstoreaccount1/state/last.txt?sv=2022&sig=s3cr3t"
                .parse()
                .unwrap();

        assert_eq!(
            blob.to_string(),
            "http://127.0.0.1:10000/devstoreaccount1/state/last.txt"
        );
    }
}
