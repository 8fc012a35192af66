use std::sync::{Arc, RwLock};

use apalis::prelude::{Data, Job};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    apis::{DiscordWebhook, FlightSource, NotificationSink, OnAirApi},
    config::PollConfig,
    cursor::CursorStore,
    error::JobError,
    selection::select_new_flights,
    utils::format_message,
};

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct PollTick(DateTime<Utc>);

impl From<DateTime<Utc>> for PollTick {
    fn from(time: DateTime<Utc>) -> Self {
        Self(time)
    }
}

impl Job for PollTick {
    const NAME: &'static str = "onair::PollFlights";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    NoNewFlights,
    Notified {
        sent: usize,
        failed: usize,
        cursor: Uuid,
    },
    CursorNotFound {
        cursor: Uuid,
    },
    /// The previous run still held the cursor when this tick fired.
    Skipped,
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub finished_at: DateTime<Utc>,
    pub outcome: RunOutcome,
}

pub struct FlightPollJob {
    company_id: Uuid,
    poll_size: u32,
    flights: Box<dyn FlightSource>,
    cursor: Box<dyn CursorStore>,
    sink: Box<dyn NotificationSink>,
    run_guard: Mutex<()>,
    last_report: RwLock<Option<RunReport>>,
}

impl FlightPollJob {
    pub fn new(
        company_id: Uuid,
        poll_size: u32,
        flights: Box<dyn FlightSource>,
        cursor: Box<dyn CursorStore>,
        sink: Box<dyn NotificationSink>,
    ) -> Self {
        Self {
            company_id,
            poll_size,
            flights,
            cursor,
            sink,
            run_guard: Mutex::new(()),
            last_report: RwLock::new(None),
        }
    }

    pub fn from_config(config: &PollConfig, pool: &PgPool) -> Self {
        Self::new(
            config.company_id,
            config.poll_size,
            Box::new(OnAirApi::new(config.api_url.clone(), config.api_key.clone())),
            config.cursor_location.open(pool),
            Box::new(DiscordWebhook::new(config.webhook_url.clone())),
        )
    }

    pub fn last_report(&self) -> Option<RunReport> {
        self.last_report
            .read()
            .ok()
            .and_then(|report| (*report).clone())
    }

    /// One poll. Runs never overlap: a call made while another is in
    /// progress returns [`RunOutcome::Skipped`] without touching anything.
    pub async fn run(&self) -> Result<RunOutcome, JobError> {
        let Ok(_guard) = self.run_guard.try_lock() else {
            tracing::warn!("Previous flight poll still running, skipping this tick");
            return Ok(RunOutcome::Skipped);
        };

        let result = self.poll().await;

        let outcome = match &result {
            Ok(outcome) => outcome.clone(),
            Err(JobError::CursorNotFound(cursor)) => {
                tracing::error!(
                    cursor = %cursor,
                    "Unable to find last processed flight in results from OnAir, aborting"
                );
                RunOutcome::CursorNotFound { cursor: *cursor }
            }
            Err(e) => {
                tracing::error!(error = %e, "Flight poll failed");
                RunOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        if let Ok(mut last_report) = self.last_report.write() {
            *last_report = Some(RunReport {
                finished_at: Utc::now(),
                outcome,
            });
        }

        result
    }

    async fn poll(&self) -> Result<RunOutcome, JobError> {
        let cursor = self.cursor.read().await?;
        tracing::info!(cursor = %cursor, "Retrieved last processed flight id");

        let flights = self
            .flights
            .recent_flights(self.company_id, self.poll_size)
            .await?;
        let polled = flights.len();

        let selection = select_new_flights(flights, cursor)?;
        tracing::info!(
            polled,
            registered = selection.registered,
            cursor_index = selection.cursor_index,
            "Located last processed flight"
        );

        let Some(latest) = selection.new_flights.last().map(|f| f.id) else {
            tracing::info!("No new flights to process");
            return Ok(RunOutcome::NoNewFlights);
        };

        let mut sent = 0;
        let mut failed = 0;

        for flight in &selection.new_flights {
            let message = format_message(flight);
            tracing::info!(flight = %flight.id, content = %message, "Announcing flight");

            match self.sink.send(&message).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    failed += 1;
                    tracing::warn!(
                        flight = %flight.id,
                        error = %e,
                        "Failed to post flight notification"
                    );
                }
            }
        }

        if let Err(e) = self.cursor.write(latest).await {
            tracing::error!(
                cursor = %latest,
                sent,
                "Notifications went out but the cursor was not updated; they will repeat next run"
            );
            return Err(e.into());
        }

        tracing::info!(cursor = %latest, sent, failed, "Updated last processed flight id");

        Ok(RunOutcome::Notified {
            sent,
            failed,
            cursor: latest,
        })
    }
}

pub async fn poll_flights_job(
    tick: PollTick,
    job: Data<Arc<FlightPollJob>>,
) -> Result<(), JobError> {
    tracing::debug!(tick = %tick.0, "Flight poll tick");

    match job.run().await {
        // Already reported; a stale cursor needs an operator, not a failed job.
        Err(JobError::CursorNotFound(_)) => Ok(()),
        result => result.map(|_| ()),
    }
}
