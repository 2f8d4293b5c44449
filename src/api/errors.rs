//! API error types
//!
//! API errors are pass-through: store and registry failures keep their
//! exception type as the code and their HTTP status.

use std::fmt;

use serde_json::Value as JsonValue;

use crate::registry::RegistryError;
use crate::store::StoreError;

/// API-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    /// Invalid request format
    InvalidRequest,
    /// Unknown operation
    UnknownOperation,
    /// Pass-through error from the store
    PassThrough,
}

impl ApiErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ApiErrorCode::InvalidRequest => "OPENMOCK_INVALID_REQUEST",
            ApiErrorCode::UnknownOperation => "OPENMOCK_UNKNOWN_OPERATION",
            ApiErrorCode::PassThrough => "PASS_THROUGH",
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// API error with preserved store error information
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Original error code string (exception type or API code)
    code: String,
    message: String,
    status_code: u16,
    /// Error body as the service would send it
    body: Option<JsonValue>,
}

impl ApiError {
    /// Create an invalid request error
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self {
            code: ApiErrorCode::InvalidRequest.code().to_string(),
            message: reason.into(),
            status_code: 400,
            body: None,
        }
    }

    /// Create an unknown operation error
    pub fn unknown_operation(op: impl Into<String>) -> Self {
        Self {
            code: ApiErrorCode::UnknownOperation.code().to_string(),
            message: format!("Unknown operation: {}", op.into()),
            status_code: 400,
            body: None,
        }
    }

    /// Create from a store error (pass-through)
    pub fn from_store_error(err: StoreError) -> Self {
        let code = match &err {
            StoreError::Query(query) => query.code().code().to_string(),
            other => other.error_type().to_string(),
        };
        Self {
            code,
            message: err.to_string(),
            status_code: err.status_code(),
            body: Some(err.to_body()),
        }
    }

    /// Create from a host parsing error
    pub fn from_registry_error(err: RegistryError) -> Self {
        Self::invalid_request(err.to_string())
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn body(&self) -> Option<&JsonValue> {
        self.body.as_ref()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status_code, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::from_store_error(err)
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        Self::from_registry_error(err)
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
