use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operation-level failure, serialized as `{"error": ..., "output": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{error}")]
pub struct OperationError {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl OperationError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            output: None,
        }
    }

    pub fn with_output(error: impl Into<String>, output: Option<String>) -> Self {
        Self {
            error: error.into(),
            output,
        }
    }
}

pub type OperationResult<T> = Result<T, OperationError>;

/// Flatten an operation result into the JSON object handed back to the caller.
pub fn envelope<T: Serialize>(result: &OperationResult<T>) -> serde_json::Value {
    let value = match result {
        Ok(payload) => serde_json::to_value(payload),
        Err(err) => serde_json::to_value(err),
    };
    value.unwrap_or_else(|err| serde_json::json!({"error": format!("Failed to encode result: {}", err)}))
}
