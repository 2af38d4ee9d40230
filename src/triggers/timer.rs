use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::pipeline::Pipeline;

/// Runs the pipeline once for a timer firing at `fired_at` and logs the result.
#[tracing::instrument(skip(pipeline, fired_at), fields(fired_at = %fired_at.to_rfc3339()))]
pub async fn run_scheduled(pipeline: &Pipeline, fired_at: DateTime<Utc>) {
    info!("Timer trigger fired");
    let result = pipeline.run().await;
    info!(result = %result.to_json(), "Scheduled run result");
}

/// Spawns a ticker that fires immediately and then every `every`. Ticks
/// missed while a run is still in progress are skipped.
pub fn spawn_schedule(pipeline: Arc<Pipeline>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            run_scheduled(&pipeline, Utc::now()).await;
        }
    })
}
