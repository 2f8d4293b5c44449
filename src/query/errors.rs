//! Query error types
//!
//! Error codes:
//! - OPENMOCK_QUERY_VALIDATION (malformed or incomparable query input)
//! - OPENMOCK_QUERY_NOT_IMPLEMENTED (a construct the emulator does not support)

use std::fmt;

/// Query-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// Malformed range, unknown comparison, incomparable operands
    ValidationFailed,
    /// Unknown query tag, metric type or source type
    NotImplemented,
}

impl QueryErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::ValidationFailed => "OPENMOCK_QUERY_VALIDATION",
            QueryErrorCode::NotImplemented => "OPENMOCK_QUERY_NOT_IMPLEMENTED",
        }
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error raised while parsing or evaluating a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    code: QueryErrorCode,
    message: String,
}

impl QueryError {
    /// Create a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::ValidationFailed,
            message: reason.into(),
        }
    }

    /// Create a not-implemented error
    pub fn not_implemented(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::NotImplemented,
            message: reason.into(),
        }
    }

    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_validation(&self) -> bool {
        self.code == QueryErrorCode::ValidationFailed
    }

    pub fn is_not_implemented(&self) -> bool {
        self.code == QueryErrorCode::NotImplemented
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for QueryError {}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
