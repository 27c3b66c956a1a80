use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

use loanapi_core::DomainError;
use loanapi_infra::services::ServiceError;

/// Error body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub message: String,
    pub path: String,
}

pub fn service_error_to_response(err: ServiceError, path: &str) -> axum::response::Response {
    match err {
        ServiceError::InvalidRequest(msg) => json_error(StatusCode::BAD_REQUEST, msg, path),
        ServiceError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, msg, path),
        // Historical contract: a dead calculator is reported as 403.
        ServiceError::DependencyUnavailable(msg) => json_error(StatusCode::FORBIDDEN, msg, path),
        ServiceError::Store(e) => {
            error!(error = %e, path, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), path)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    message: impl Into<String>,
    path: &str,
) -> axum::response::Response {
    (
        status,
        axum::Json(ErrorBody {
            timestamp: Utc::now(),
            status: status.as_u16(),
            message: message.into(),
            path: path.to_string(),
        }),
    )
        .into_response()
}

/// Any unreadable body is a bad request, whatever axum's own status would be.
pub fn json_rejection(rejection: JsonRejection, path: &str) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, rejection.body_text(), path)
}

pub fn parse_id<T>(raw: &str, path: &str) -> Result<T, axum::response::Response>
where
    T: std::str::FromStr<Err = DomainError>,
{
    raw.parse::<T>()
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, e.to_string(), path))
}
