//! Method channel responses.

use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, CODE_INTERNAL};

/// Outcome of one bridge call, in the three shapes a method channel knows.
///
/// Serializes adjacently tagged:
///
/// ```
/// use core_service::MethodResponse;
/// use serde_json::json;
///
/// let response = MethodResponse::success(true);
/// assert_eq!(
///     serde_json::to_value(&response).unwrap(),
///     json!({ "status": "success", "payload": true })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "payload", rename_all = "camelCase")]
pub enum MethodResponse {
    Success(Value),
    Error {
        code: String,
        message: String,
        details: Option<String>,
    },
    NotImplemented,
}

impl MethodResponse {
    /// Wrap a serializable result.
    pub fn success(value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => MethodResponse::Success(value),
            Err(e) => MethodResponse::Error {
                code: CODE_INTERNAL.to_string(),
                message: format!("Failed to encode result: {}", e),
                details: None,
            },
        }
    }

    pub fn from_error(err: &CoreError) -> Self {
        MethodResponse::Error {
            code: err.code().to_string(),
            message: err.to_string(),
            details: err.details(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success(_))
    }

    /// Error code, when this is an error.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            MethodResponse::Error { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            MethodResponse::Success(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_response_carries_code_and_message() {
        let response = MethodResponse::from_error(&CoreError::NotInstalled);

        assert_eq!(response.error_code(), Some("NOT_INSTALLED"));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "status": "error",
                "payload": {
                    "code": "NOT_INSTALLED",
                    "message": "Health Connect APK not installed on device",
                    "details": null,
                }
            })
        );
    }

    #[test]
    fn test_not_implemented_serialization() {
        let response = MethodResponse::NotImplemented;
        assert!(!response.is_success());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "status": "notImplemented" })
        );
    }

    #[test]
    fn test_success_payload() {
        let response = MethodResponse::success(vec![1, 2, 3]);
        assert!(response.is_success());
        assert_eq!(response.payload(), Some(&json!([1, 2, 3])));
        assert_eq!(response.error_code(), None);
    }
}
