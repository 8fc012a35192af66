use reqwest::StatusCode;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("OnAir request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OnAir returned an error: {0}")]
    Upstream(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cursor store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cursor store responded with {0}")]
    Status(StatusCode),

    #[error("cursor database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("cursor store holds no flight id")]
    Empty,

    #[error("cursor {value:?} is not a flight id: {source}")]
    InvalidCursor {
        value: String,
        #[source]
        source: uuid::Error,
    },
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook rejected the message with status {status}")]
    Rejected { status: u16 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing secret {0}")]
    Missing(&'static str),

    #[error("invalid secret {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Reasons a poll run stops short of advancing the cursor.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("last processed flight {0} is not in the polled flights")]
    CursorNotFound(Uuid),
}
