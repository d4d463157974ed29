use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable classification of an engine failure.
///
/// Transports branch on this instead of matching error message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Validation,
    Execution,
    ChainResolution,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::Validation => write!(f, "validation"),
            Self::Execution => write!(f, "execution"),
            Self::ChainResolution => write!(f, "chain_resolution"),
        }
    }
}

/// Errors produced by the Executor, the Chain Runner, and the public gate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("skill not found: {id}")]
    NotFound { id: String, known: Vec<String> },

    #[error("skill '{id}' cannot be executed on this endpoint")]
    Forbidden { id: String, allowed: Vec<String> },

    #[error("input validation failed: {0}")]
    Validation(String),

    #[error("skill chain must contain at least one step")]
    EmptyChain,

    #[error("execution failed: {0}")]
    Execution(String),

    #[error("chain resolution failed for field '{field}': {reason}")]
    ChainResolution { field: String, reason: PathError },
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Validation(_) | Self::EmptyChain => ErrorKind::Validation,
            Self::Execution(_) => ErrorKind::Execution,
            Self::ChainResolution { .. } => ErrorKind::ChainResolution,
        }
    }

    /// Structured context attached to the error body, when there is any.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::NotFound { known, .. } => Some(serde_json::json!({ "availableSkills": known })),
            Self::Forbidden { allowed, .. } => Some(serde_json::json!({ "allowed": allowed })),
            Self::ChainResolution { field, .. } => Some(serde_json::json!({ "field": field })),
            _ => None,
        }
    }
}

/// Failure to tokenize or resolve a `$previous.<path>` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("'{0}' is not a $previous placeholder")]
    NotAPlaceholder(String),

    #[error("empty path segment at position {0}")]
    EmptySegment(usize),

    #[error("unsafe path segment '{0}'")]
    UnsafeSegment(String),

    #[error("there is no previous step output to resolve against")]
    NoPrevious,

    #[error("'{segment}' not found under '{at}'")]
    Missing { segment: String, at: String },

    #[error("cannot look up '{segment}' in a {found} at '{at}'")]
    NotAContainer {
        segment: String,
        at: String,
        found: &'static str,
    },
}

/// Errors raised while registering a skill descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid skill id '{0}': expected dot-namespaced segments like 'tax.calculate'")]
    InvalidId(String),

    #[error("skill '{0}' has an empty name")]
    EmptyName(String),

    #[error("skill '{id}' has invalid version '{version}'")]
    InvalidVersion { id: String, version: String },

    #[error("skill '{id}' has an invalid input schema: {reason}")]
    InvalidSchema { id: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(EngineError::EmptyChain.kind(), ErrorKind::Validation);
        assert_eq!(
            EngineError::Execution("boom".into()).kind(),
            ErrorKind::Execution
        );
        let err = EngineError::ChainResolution {
            field: "income".into(),
            reason: PathError::NoPrevious,
        };
        assert_eq!(err.kind(), ErrorKind::ChainResolution);
    }

    #[test]
    fn test_not_found_details_list_known_ids() {
        let err = EngineError::NotFound {
            id: "x.y".into(),
            known: vec!["tax.calculate".into()],
        };
        assert_eq!(err.to_string(), "skill not found: x.y");
        assert_eq!(
            err.details().unwrap()["availableSkills"][0],
            "tax.calculate"
        );
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::ChainResolution).unwrap();
        assert_eq!(json, "\"chain_resolution\"");
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
    }
}
