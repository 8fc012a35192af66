use shuttle_runtime::async_trait;
use uuid::Uuid;

use crate::{
    error::{ApiError, NotificationError},
    types::Flight,
};

mod discord;
mod onair;

pub use discord::DiscordWebhook;
pub use onair::OnAirApi;

#[async_trait]
pub trait FlightSource: Send + Sync {
    /// The company's `limit` most recent flights, in no particular order.
    async fn recent_flights(&self, company_id: Uuid, limit: u32)
        -> Result<Vec<Flight>, ApiError>;
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, content: &str) -> Result<(), NotificationError>;
}
