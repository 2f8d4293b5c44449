//! Connection cache
//!
//! Clients built for the same `host:port` share one [`FakeSearch`]. The
//! first normalized host decides the key; tests call [`Registry::clear`]
//! to start from empty stores.

mod hosts;

pub use hosts::{
    normalize_hosts, HostSpec, RegistryError, RegistryResult, DEFAULT_HOST, DEFAULT_PORT,
};

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::observability::{log_event_with_fields, Event};
use crate::store::FakeSearch;

/// A store shared by every client of one host
pub type SharedStore = Rc<RefCell<FakeSearch>>;

/// Instances keyed by `host:port`
#[derive(Debug, Default)]
pub struct Registry {
    instances: HashMap<String, SharedStore>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the store for the first of `hosts`, creating it on first use
    pub fn connect(&mut self, hosts: &[HostSpec]) -> SharedStore {
        let key = hosts.first().cloned().unwrap_or_default().key();
        let instance = self.instances.entry(key.clone()).or_insert_with(|| {
            log_event_with_fields(Event::StoreCreated, &[("key", &key)]);
            Rc::new(RefCell::new(FakeSearch::new()))
        });
        Rc::clone(instance)
    }

    /// Store for `localhost:9200`
    pub fn connect_default(&mut self) -> SharedStore {
        self.connect(&[])
    }

    /// Drops every cached instance
    pub fn clear(&mut self) {
        let dropped = self.instances.len();
        self.instances.clear();
        log_event_with_fields(Event::RegistryCleared, &[("instances", &dropped.to_string())]);
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
