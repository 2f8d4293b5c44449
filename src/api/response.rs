//! API response types
//!
//! One JSON envelope per request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ApiError;

/// Success response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub status: String,
    pub data: Value,
}

impl SuccessResponse {
    pub fn new(data: Value) -> Self {
        Self {
            status: "ok".to_string(),
            data,
        }
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("SuccessResponse serialization cannot fail")
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
    pub status_code: u16,
    /// The body a real service would answer with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ErrorResponse {
    /// Create from an API error
    pub fn from_error(err: &ApiError) -> Self {
        Self {
            status: "error".to_string(),
            code: err.code().to_string(),
            message: err.message().to_string(),
            status_code: err.status_code(),
            error: err.body().cloned(),
        }
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("ErrorResponse serialization cannot fail")
    }
}

/// Unified response type
#[derive(Debug, Clone)]
pub enum Response {
    Success(SuccessResponse),
    Error(ErrorResponse),
}

impl Response {
    pub fn success(data: Value) -> Self {
        Response::Success(SuccessResponse::new(data))
    }

    pub fn error(err: &ApiError) -> Self {
        Response::Error(ErrorResponse::from_error(err))
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        match self {
            Response::Success(r) => r.to_json(),
            Response::Error(r) => r.to_json(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    /// Payload of a success response
    pub fn data(&self) -> Option<&Value> {
        match self {
            Response::Success(r) => Some(&r.data),
            Response::Error(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use serde_json::json;

    #[test]
    fn test_success_response() {
        let resp = SuccessResponse::new(json!({"found": true}));
        let json = resp.to_json();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("found"));
    }

    #[test]
    fn test_error_response() {
        let err = ApiError::invalid_request("test error");
        let json = ErrorResponse::from_error(&err).to_json();
        assert!(json.contains("\"status\":\"error\""));
        assert!(json.contains("OPENMOCK_INVALID_REQUEST"));
        assert!(!json.contains("\"error\":"));
    }

    #[test]
    fn test_server_failure_carries_body() {
        let err = ApiError::from(StoreError::ServerFailure);
        let resp = ErrorResponse::from_error(&err);
        assert_eq!(resp.status_code, 500);
        assert_eq!(
            resp.error,
            Some(json!({"status_code": 500, "error": "Internal Server Error"}))
        );
    }
}
