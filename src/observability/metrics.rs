//! Per-store counters
//!
//! - Counters only
//! - Monotonic increase, except the live document gauge
//! - Thread-safe but lock-minimal

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one emulated store
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    searches_executed: AtomicU64,
    searches_rejected: AtomicU64,
    documents_indexed: AtomicU64,
    documents_updated: AtomicU64,
    documents_deleted: AtomicU64,
    bulk_requests: AtomicU64,
    scrolls_opened: AtomicU64,
    server_failures: AtomicU64,
    documents: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Query metrics

    pub fn increment_searches_executed(&self) {
        self.searches_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_searches_rejected(&self) {
        self.searches_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_scrolls_opened(&self) {
        self.scrolls_opened.fetch_add(1, Ordering::Relaxed);
    }

    // Document metrics

    pub fn increment_documents_indexed(&self) {
        self.documents_indexed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_documents_updated(&self) {
        self.documents_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_documents_deleted(&self) {
        self.documents_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_bulk_requests(&self) {
        self.bulk_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Sets the live document count
    pub fn set_documents(&self, count: u64) {
        self.documents.store(count, Ordering::Relaxed);
    }

    // Fault injection

    pub fn increment_server_failures(&self) {
        self.server_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Export metrics as JSON with deterministic key order
    pub fn to_json(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            r#"{{"bulk_requests":{},"documents":{},"documents_deleted":{},"documents_indexed":{},"documents_updated":{},"scrolls_opened":{},"searches_executed":{},"searches_rejected":{},"server_failures":{}}}"#,
            snapshot.bulk_requests,
            snapshot.documents,
            snapshot.documents_deleted,
            snapshot.documents_indexed,
            snapshot.documents_updated,
            snapshot.scrolls_opened,
            snapshot.searches_executed,
            snapshot.searches_rejected,
            snapshot.server_failures,
        )
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            searches_executed: self.searches_executed.load(Ordering::Relaxed),
            searches_rejected: self.searches_rejected.load(Ordering::Relaxed),
            documents_indexed: self.documents_indexed.load(Ordering::Relaxed),
            documents_updated: self.documents_updated.load(Ordering::Relaxed),
            documents_deleted: self.documents_deleted.load(Ordering::Relaxed),
            bulk_requests: self.bulk_requests.load(Ordering::Relaxed),
            scrolls_opened: self.scrolls_opened.load(Ordering::Relaxed),
            server_failures: self.server_failures.load(Ordering::Relaxed),
            documents: self.documents.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub searches_executed: u64,
    pub searches_rejected: u64,
    pub documents_indexed: u64,
    pub documents_updated: u64,
    pub documents_deleted: u64,
    pub bulk_requests: u64,
    pub scrolls_opened: u64,
    pub server_failures: u64,
    pub documents: u64,
}
