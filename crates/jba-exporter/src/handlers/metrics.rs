use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use jba_common::error::ExporterError;
use tracing::error;

use crate::{handlers::ExporterApiError, router::ExporterState};

pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn prometheus_metrics(
    State(state): State<Arc<ExporterState>>,
) -> Result<Response, ExporterApiError> {
    let registry = Arc::clone(&state.registry);
    // Collectors read from disk synchronously.
    let payload = tokio::task::spawn_blocking(move || registry.render_prometheus())
        .await
        .map_err(|err| ExporterError::InternalError(format!("scrape task failed: {err}")))
        .and_then(|rendered| rendered)
        .map_err(|err| {
            error!(error = %err, "scrape failed");
            ExporterApiError(err)
        })?;

    let mut response = Response::new(Body::from(payload));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(PROMETHEUS_CONTENT_TYPE),
    );

    Ok(response)
}
