use std::sync::Arc;

use serde_json::json;
use warp::{Filter, Rejection, Reply};

use crate::poll_job::FlightPollJob;

/// `GET /health` reports liveness and how the most recent poll went.
pub fn routes(
    job: Arc<FlightPollJob>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("health").and(warp::get()).map(move || {
        warp::reply::json(&json!({
            "status": "ok",
            "last_run": job.last_report(),
        }))
    })
}
