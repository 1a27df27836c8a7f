pub mod metrics;

use axum::{
    http::{StatusCode, header},
    response::IntoResponse,
};
use jba_common::error::ExporterError;

pub struct ExporterApiError(pub ExporterError);

impl From<ExporterError> for ExporterApiError {
    fn from(value: ExporterError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ExporterApiError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("failed to collect metrics: {}\n", self.0),
        )
            .into_response()
    }
}
