//! Application error type mapping to HTTP status codes and envelope format.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use abacus_types::envelope::{Envelope, ErrorBody};
use abacus_types::error::{EngineError, ErrorKind};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Engine-reported failure, classified by its kind.
    Engine(EngineError),
    /// Malformed request body or query string.
    BadRequest(String),
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        AppError::Engine(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

/// HTTP status for an engine error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Execution | ErrorKind::ChainResolution => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Engine(e) => (status_for(e.kind()), ErrorBody::from(e)),
            AppError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    kind: ErrorKind::Validation,
                    message,
                    details: None,
                },
            ),
        };

        (status, axum::Json(Envelope::<Value>::err(body))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                EngineError::NotFound {
                    id: "x.y".into(),
                    known: vec![],
                },
                StatusCode::NOT_FOUND,
            ),
            (
                EngineError::Forbidden {
                    id: "x.y".into(),
                    allowed: vec![],
                },
                StatusCode::FORBIDDEN,
            ),
            (EngineError::Validation("a: required".into()), StatusCode::BAD_REQUEST),
            (EngineError::EmptyChain, StatusCode::BAD_REQUEST),
            (EngineError::Execution("boom".into()), StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_bad_request_is_validation_kind() {
        let response = AppError::BadRequest("expected value".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
