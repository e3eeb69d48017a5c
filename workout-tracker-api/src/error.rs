use serde::{Deserialize, Serialize};

/// Public API error response format.
///
/// `error` is a stable machine-readable code such as `INVALID_REFRESH_TOKEN`;
/// `message` is meant for humans and may change.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
