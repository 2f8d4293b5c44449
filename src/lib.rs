//! openmock - an in-process, deterministic emulator of a search service
//!
//! Lets test suites exercise search-client code without a live server.
//! Documents live in memory per index; queries are evaluated by a
//! recursive condition evaluator and aggregations by a composite bucketer.

pub mod aggregation;
pub mod api;
pub mod cli;
pub mod observability;
pub mod query;
pub mod registry;
pub mod store;
pub mod value;
