use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::info;

use crate::pipeline::Pipeline;

/// Router that runs the pipeline for every request, whatever the method or
/// path, and answers `200` with the run result as JSON. Failed sources are
/// reported in the body, not through the status code.
pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new().fallback(on_demand).with_state(pipeline)
}

async fn on_demand(State(pipeline): State<Arc<Pipeline>>) -> impl IntoResponse {
    info!("On-demand trigger received");
    let result = pipeline.run().await;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        result.to_json(),
    )
}
