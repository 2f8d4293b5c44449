//! Request layer
//!
//! Decodes JSON requests, routes them to a store through the registry and
//! wraps the outcome in a response envelope.
//!
//! # Supported Operations
//!
//! - ping, info
//! - create, index, exists, get, get_source, mget, update, update_by_query, delete
//! - bulk, search, scroll, clear_scroll, count, msearch, suggest, create_pit
//! - indices.create, indices.exists, indices.refresh, indices.delete
//! - server_failure.enable, server_failure.disable, metrics

mod errors;
mod handler;
mod request;
mod response;

pub use errors::{ApiError, ApiErrorCode, ApiResult};
pub use handler::ApiHandler;
pub use request::{Operation, Request};
pub use response::{ErrorResponse, Response, SuccessResponse};
