use shuttle_runtime::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{parse_cursor, CursorStore};
use crate::error::StorageError;

pub struct PgCursorStore {
    pool: PgPool,
    name: String,
}

impl PgCursorStore {
    pub fn new(pool: PgPool, name: &str) -> Self {
        Self {
            pool,
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl CursorStore for PgCursorStore {
    async fn read(&self) -> Result<Uuid, StorageError> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT flight_id FROM flight_cursors WHERE name = $1;")
                .bind(&self.name)
                .fetch_optional(&self.pool)
                .await?;

        match stored {
            Some(raw) => parse_cursor(&raw),
            None => Err(StorageError::Empty),
        }
    }

    async fn write(&self, flight_id: Uuid) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO flight_cursors (name, flight_id) VALUES ($1, $2) \
            ON CONFLICT (name) DO UPDATE SET flight_id = EXCLUDED.flight_id, updated_at = now();",
        )
        .bind(&self.name)
        .bind(flight_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
