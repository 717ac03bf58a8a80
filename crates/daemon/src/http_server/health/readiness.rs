use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tokio::time::timeout;

use super::data_source::*;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

#[tracing::instrument]
pub async fn handler(data_src: StateDataSource) -> Response {
    let outcome = match timeout(HEALTH_CHECK_TIMEOUT, data_src.is_ready()).await {
        Ok(result) => result,
        Err(_) => return failure("health check timed out"),
    };

    match outcome {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))).into_response(),
        Err(DataSourceError::DependencyFailure) => failure("secret store isn't available"),
        Err(DataSourceError::ShuttingDown) => failure("service is shutting down"),
    }
}

fn failure(message: &str) -> Response {
    let msg = serde_json::json!({"status": "failure", "message": message});
    (StatusCode::SERVICE_UNAVAILABLE, Json(msg)).into_response()
}
