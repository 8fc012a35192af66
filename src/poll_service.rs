use std::sync::Arc;

use apalis::{
    cron::CronStream,
    prelude::{Monitor, WorkerBuilder, WorkerFactoryFn},
    utils::TokioExecutor,
};
use sqlx::PgPool;

use crate::{
    config::PollConfig,
    poll_job::{poll_flights_job, FlightPollJob},
    status,
};

pub struct PollService {
    pub config: PollConfig,
    pub pool: PgPool,
}

#[shuttle_runtime::async_trait]
impl shuttle_runtime::Service for PollService {
    async fn bind(self, addr: std::net::SocketAddr) -> Result<(), shuttle_runtime::Error> {
        let job = Arc::new(FlightPollJob::from_config(&self.config, &self.pool));

        let worker = WorkerBuilder::new("onair-flight-poller")
            .data(job.clone())
            .stream(CronStream::new(self.config.schedule.clone()).into_stream())
            .build_fn(poll_flights_job);

        tracing::info!(%addr, "Starting flight poller and status endpoint");

        tokio::select! {
            result = Monitor::<TokioExecutor>::new().register(worker).run() => {
                result.map_err(anyhow::Error::from)?;
            }
            _ = warp::serve(status::routes(job)).run(addr) => {}
        }

        Ok(())
    }
}
