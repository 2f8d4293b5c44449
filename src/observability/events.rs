//! Observable emulator events
//!
//! Events are explicit and typed; each carries the severity it is logged at.

use std::fmt;

use super::Severity;

/// Observable events of the emulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Command-line session started
    SessionStart,
    /// Command-line session finished
    SessionComplete,
    /// Configuration loaded
    ConfigLoaded,
    /// Fixture documents loaded into the store
    FixturesLoaded,

    // Registry
    /// A new store was created for a host key
    StoreCreated,
    /// All cached stores were dropped
    RegistryCleared,

    // Indices
    /// Index created
    IndexCreated,
    /// Index deleted
    IndexDeleted,

    // Documents
    /// Document created or replaced
    DocumentIndexed,
    /// Document partially updated
    DocumentUpdated,
    /// Document removed
    DocumentDeleted,
    /// Bulk request processed
    BulkProcessed,

    // Queries
    /// Search evaluated
    SearchExecuted,
    /// Search rejected by the query engine
    SearchRejected,
    /// Scroll cursor advanced
    ScrollAdvanced,
    /// Unknown range relation fell back to intersects
    QueryRelationDefaulted,

    // Fault injection
    /// Server failure switch turned on
    ServerFailureEnabled,
    /// Server failure switch turned off
    ServerFailureDisabled,
    /// A call was answered with a simulated server failure
    ServerFailureReturned,

    // Requests
    /// Request could not be decoded or dispatched
    RequestFailed,
}

impl Event {
    /// Returns the string representation for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SessionStart => "OPENMOCK_SESSION_START",
            Event::SessionComplete => "OPENMOCK_SESSION_COMPLETE",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::FixturesLoaded => "FIXTURES_LOADED",
            Event::StoreCreated => "STORE_CREATED",
            Event::RegistryCleared => "REGISTRY_CLEARED",
            Event::IndexCreated => "INDEX_CREATED",
            Event::IndexDeleted => "INDEX_DELETED",
            Event::DocumentIndexed => "DOCUMENT_INDEXED",
            Event::DocumentUpdated => "DOCUMENT_UPDATED",
            Event::DocumentDeleted => "DOCUMENT_DELETED",
            Event::BulkProcessed => "BULK_PROCESSED",
            Event::SearchExecuted => "SEARCH_EXECUTED",
            Event::SearchRejected => "SEARCH_REJECTED",
            Event::ScrollAdvanced => "SCROLL_ADVANCED",
            Event::QueryRelationDefaulted => "QUERY_RELATION_DEFAULTED",
            Event::ServerFailureEnabled => "SERVER_FAILURE_ENABLED",
            Event::ServerFailureDisabled => "SERVER_FAILURE_DISABLED",
            Event::ServerFailureReturned => "SERVER_FAILURE_RETURNED",
            Event::RequestFailed => "REQUEST_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::SearchRejected
            | Event::QueryRelationDefaulted
            | Event::ServerFailureReturned => Severity::Warn,
            Event::RequestFailed => Severity::Error,
            Event::DocumentIndexed | Event::DocumentUpdated | Event::DocumentDeleted => {
                Severity::Trace
            }
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
