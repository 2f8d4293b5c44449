//! Store errors
//!
//! Each variant maps onto the status code and exception type a real
//! search service would answer with.

use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use crate::query::QueryError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Malformed request
    #[error("{reason}")]
    BadRequest {
        error_type: &'static str,
        reason: String,
    },

    /// Index does not exist
    #[error("IndexMissingException[[{0}] missing]")]
    IndexNotFound(String),

    /// Document does not exist
    #[error("[{id}]: document missing")]
    DocumentNotFound { index: String, id: String },

    /// Scroll id unknown or already consumed
    #[error("No search context found for id [{0}]")]
    ScrollNotFound(String),

    /// Document id already taken
    #[error("[{id}]: version conflict, document already exists")]
    Conflict { index: String, id: String },

    /// Query parsing or evaluation failed
    #[error("{0}")]
    Query(#[from] QueryError),

    /// Construct accepted by the wire protocol but not emulated
    #[error("{0}")]
    NotImplemented(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Simulated server failure
    #[error("Internal Server Error")]
    ServerFailure,
}

impl StoreError {
    /// Shorthand for an `action_request_validation_exception`
    pub fn validation(reason: impl Into<String>) -> Self {
        StoreError::BadRequest {
            error_type: "action_request_validation_exception",
            reason: reason.into(),
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::BadRequest { .. } => 400,
            StoreError::Query(err) if err.is_not_implemented() => 501,
            StoreError::Query(_) => 400,
            StoreError::IndexNotFound(_)
            | StoreError::DocumentNotFound { .. }
            | StoreError::ScrollNotFound(_) => 404,
            StoreError::Conflict { .. } => 409,
            StoreError::NotImplemented(_) => 501,
            StoreError::ServerFailure => 500,
        }
    }

    /// Exception type name reported in error bodies
    pub fn error_type(&self) -> &'static str {
        match self {
            StoreError::BadRequest { error_type, .. } => *error_type,
            StoreError::IndexNotFound(_) => "index_not_found_exception",
            StoreError::DocumentNotFound { .. } => "document_missing_exception",
            StoreError::ScrollNotFound(_) => "search_context_missing_exception",
            StoreError::Conflict { .. } => "version_conflict_engine_exception",
            StoreError::Query(_) => "query_shard_exception",
            StoreError::NotImplemented(_) => "not_implemented",
            StoreError::ServerFailure => "internal_server_error",
        }
    }

    /// Error body as the service would return it
    pub fn to_body(&self) -> JsonValue {
        match self {
            StoreError::ServerFailure => json!({
                "status_code": 500,
                "error": "Internal Server Error",
            }),
            other => json!({
                "error": {"type": other.error_type(), "reason": other.to_string()},
                "status": other.status_code(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(StoreError::validation("missing id").status_code(), 400);
        assert_eq!(StoreError::IndexNotFound("logs".into()).status_code(), 404);
        assert_eq!(
            StoreError::Conflict {
                index: "logs".into(),
                id: "1".into()
            }
            .status_code(),
            409
        );
        assert_eq!(StoreError::ServerFailure.status_code(), 500);
        assert_eq!(
            StoreError::from(QueryError::not_implemented("fuzzy")).status_code(),
            501
        );
        assert_eq!(
            StoreError::from(QueryError::validation("bad range")).status_code(),
            400
        );
    }

    #[test]
    fn test_server_failure_body() {
        assert_eq!(
            StoreError::ServerFailure.to_body(),
            json!({"status_code": 500, "error": "Internal Server Error"})
        );
    }

    #[test]
    fn test_index_missing_message() {
        let err = StoreError::IndexNotFound("logs".into());
        assert_eq!(err.to_string(), "IndexMissingException[[logs] missing]");
        assert_eq!(err.to_body()["error"]["type"], "index_not_found_exception");
    }
}
