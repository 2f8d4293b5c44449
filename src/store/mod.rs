//! In-memory document store
//!
//! [`FakeSearch`] emulates the document, search and index-management calls
//! of a search service over a `BTreeMap` of index name to documents. Every
//! call first checks the server-failure switch.

mod bulk;
mod document;
mod errors;
mod fake;
mod ids;
mod indices;
mod params;
mod response;
mod search;
mod update;

pub use bulk::BulkAction;
pub use document::{Document, DEFAULT_DOC_TYPE};
pub use errors::{StoreError, StoreResult};
pub use fake::FakeSearch;
pub use ids::{random_id, random_pit_id, random_scroll_id};
pub use indices::{Acknowledged, IndicesClient};
pub use params::{IndexTarget, RequestParams};
pub use response::{
    AggregationResult, BulkItem, BulkResponse, CountResponse, DeleteResponse, GetResponse, Hit,
    Hits, InfoResponse, MgetResponse, MsearchResponse, PitResponse, SearchResponse, Shards,
    SuggestEntry, SuggestOption, SuggestResponse, TotalHits, UpdateByQueryResponse,
    UpdateResponse, VersionInfo, WriteResponse,
};
pub use search::{SearchBody, SortClause, DEFAULT_SCROLL_SIZE};
pub use update::{parse_script, Assignment};
