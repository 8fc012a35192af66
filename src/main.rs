use anyhow::Context;
use config::PollConfig;
use poll_service::PollService;
use shuttle_runtime::SecretStore;
use sqlx::PgPool;

mod apis;
mod config;
mod cursor;
mod error;
mod poll_job;
mod poll_service;
mod selection;
mod status;
mod types;
mod utils;

#[shuttle_runtime::main]
async fn shuttle_main(
    #[shuttle_runtime::Secrets] secrets: SecretStore,
    #[shuttle_shared_db::Postgres] pool: PgPool,
) -> Result<PollService, shuttle_runtime::Error> {
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let config = PollConfig::from_secrets(&secrets).context("Invalid poller configuration")?;

    tracing::info!(
        company = %config.company_id,
        poll_size = config.poll_size,
        cursor = %config.cursor_location,
        "Loaded flight poller configuration"
    );

    Ok(PollService { config, pool })
}
