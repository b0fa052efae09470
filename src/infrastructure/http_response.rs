// HTTP response utilities for JSON payloads and error mapping
use crate::domain::error::NowcastError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Core error carried to the HTTP boundary
#[derive(Debug)]
pub struct ApiError(pub NowcastError);

impl From<NowcastError> for ApiError {
    fn from(err: NowcastError) -> Self {
        Self(err)
    }
}

pub fn status_for(err: &NowcastError) -> StatusCode {
    match err {
        NowcastError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        NowcastError::CatalogUnavailable(_)
        | NowcastError::CatalogMalformed(_)
        | NowcastError::TileUnavailable(_)
        | NowcastError::TileDecode(_)
        | NowcastError::SeriesUnavailable { .. } => StatusCode::BAD_GATEWAY,
        NowcastError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", self.0);
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {}", self.0);
        }

        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping_keeps_failures_distinct() {
        assert_eq!(
            status_for(&NowcastError::InvalidInput("lat".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&NowcastError::CatalogMalformed("eof".to_string())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&NowcastError::SeriesUnavailable { failed: 3 }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&NowcastError::DeadlineExceeded(Duration::from_secs(20))),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_error_response_status() {
        let response = ApiError(NowcastError::TileDecode("bad png".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
