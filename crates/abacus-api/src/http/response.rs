//! Envelope response format for all API responses.
//!
//! Every response is wrapped in the same envelope:
//! ```json
//! { "success": true, "data": { ... } }
//! { "success": false, "error": { "kind": "not_found", "message": "...", "details": { ... } } }
//! ```
//! Handler timing is reported in the `x-response-time-ms` header.

use std::time::Instant;

use axum::Json;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use abacus_types::envelope::Envelope;

pub const RESPONSE_TIME_HEADER: &str = "x-response-time-ms";

#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    envelope: Envelope<T>,
    response_time_ms: u64,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success envelope around `data`.
    pub fn success(data: T, started: Instant) -> Self {
        Self::from_envelope(Envelope::ok(data), started)
    }

    /// Send a prepared envelope as-is with status 200.
    pub fn from_envelope(envelope: Envelope<T>, started: Instant) -> Self {
        Self {
            envelope,
            response_time_ms: started.elapsed().as_millis() as u64,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::OK, Json(self.envelope)).into_response();
        response.headers_mut().insert(
            RESPONSE_TIME_HEADER,
            HeaderValue::from(self.response_time_ms),
        );
        response
    }
}
