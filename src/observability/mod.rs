//! Observability for the emulator
//!
//! - Structured logging (JSON, one line per event)
//! - Per-store counters
//! - Typed lifecycle and request events
//!
//! Observability is read-only: nothing here changes emulator behaviour.
//!
//! # Usage
//!
//! ```ignore
//! use openmock::observability::{log_event_with_fields, Event, MetricsRegistry};
//!
//! log_event_with_fields(Event::SearchExecuted, &[("hits", "3")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_searches_executed();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::SessionStart);
        log_event(Event::SessionComplete);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::ConfigLoaded, &[("path", "/tmp/openmock.json")]);
    }
}
