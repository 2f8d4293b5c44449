//! Query engine
//!
//! Parses the wire query language into a typed [`Condition`] tree and
//! evaluates it against document sources.
//!
//! # Semantics
//!
//! - `match`: case-insensitive, accepts substring containment
//! - `term`: case-sensitive, accepts substring containment
//! - `.keyword` field suffix: disables substring containment
//! - `range`: scalar points, or range-vs-range under a relation
//! - compounds short-circuit; the first error aborts evaluation

mod condition;
mod errors;
mod evaluator;
mod matcher;
mod range;

pub use condition::{
    Condition, FieldClause, MultiMatchClause, Query, QueryTag, RangeClause, TermsClause,
};
pub use errors::{QueryError, QueryErrorCode, QueryResult};
pub use evaluator::evaluate;
pub use matcher::{field_exists, field_matches, FieldRef};
pub use range::{
    bounds_of, build_range, compare_ranges, compare_scalar, parse_timestamp, point_satisfies,
    CompareOp, Endpoint, Interval, Relation,
};
