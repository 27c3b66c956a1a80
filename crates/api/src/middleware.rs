use std::time::Instant;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wrap every request in a span carrying a fresh request id.
///
/// The id is echoed back in the `x-request-id` response header.
pub async fn request_span(req: Request, next: Next) -> Response {
    let request_id = Uuid::now_v7();
    let span = info_span!(
        "http_request",
        %request_id,
        method = %req.method(),
        path = %req.uri().path()
    );

    async move {
        let started = Instant::now();
        let mut res = next.run(req).await;

        info!(
            status = res.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            res.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        res
    }
    .instrument(span)
    .await
}
