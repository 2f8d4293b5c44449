//! Index management sub-client

use serde::Serialize;

use super::errors::{StoreError, StoreResult};
use super::fake::FakeSearch;
use crate::observability::{log_event_with_fields, Event};

/// Answer to index creation and deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledged {
    pub acknowledged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

/// Borrowed view over a store's index table
pub struct IndicesClient<'a> {
    store: &'a mut FakeSearch,
}

impl FakeSearch {
    pub fn indices(&mut self) -> IndicesClient<'_> {
        IndicesClient { store: self }
    }
}

impl IndicesClient<'_> {
    /// Creates an empty index; creating an existing index is a no-op
    pub fn create(&mut self, index: &str) -> StoreResult<Acknowledged> {
        self.store.available()?;
        self.store.ensure_index(index);
        Ok(Acknowledged {
            acknowledged: true,
            index: Some(index.to_string()),
        })
    }

    pub fn exists(&self, index: &str) -> StoreResult<bool> {
        self.store.available()?;
        Ok(self.store.indices.contains_key(index))
    }

    /// Documents are visible as soon as they are written
    pub fn refresh(&self, _index: Option<&str>) -> StoreResult<()> {
        self.store.available()
    }

    /// Drops an index and every document in it
    pub fn delete(&mut self, index: &str) -> StoreResult<Acknowledged> {
        self.store.available()?;
        if self.store.indices.remove(index).is_none() {
            return Err(StoreError::IndexNotFound(index.to_string()));
        }
        self.store.refresh_document_gauge();
        log_event_with_fields(Event::IndexDeleted, &[("index", index)]);
        Ok(Acknowledged {
            acknowledged: true,
            index: None,
        })
    }
}
