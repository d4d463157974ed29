//! Uniform `{ success, data?, error? }` response shape shared by every surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EngineError, ErrorKind};

/// Structured error carried inside an [`Envelope`] or a [`crate::chain::StepOutcome`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&EngineError> for ErrorBody {
    fn from(err: &EngineError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            details: err.details(),
        }
    }
}

impl From<EngineError> for ErrorBody {
    fn from(err: EngineError) -> Self {
        Self::from(&err)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl Into<ErrorBody>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T> From<Result<T, EngineError>> for Envelope<T> {
    fn from(result: Result<T, EngineError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_omits_error() {
        let json = serde_json::to_value(Envelope::ok(json!({"x": 1}))).unwrap();
        assert_eq!(json, json!({"success": true, "data": {"x": 1}}));
    }

    #[test]
    fn test_err_envelope_carries_kind_and_details() {
        let env: Envelope<Value> = Envelope::err(EngineError::Forbidden {
            id: "tax.optimize".into(),
            allowed: vec!["tax.calculate".into()],
        });
        let json = serde_json::to_value(env).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
        assert_eq!(json["error"]["kind"], "forbidden");
        assert_eq!(json["error"]["details"]["allowed"][0], "tax.calculate");
    }
}
