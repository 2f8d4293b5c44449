//! Request parameters and index targets

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

use super::errors::{StoreError, StoreResult};

/// Query-string style parameters accepted by store operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RequestParams {
    /// Keep-alive of a scroll cursor; presence opens one
    pub scroll: Option<String>,
    pub size: Option<usize>,
    pub from: Option<usize>,
    /// Status codes answered with a "not found" body instead of an error
    #[serde(deserialize_with = "one_or_many")]
    pub ignore: Vec<u16>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scroll(mut self, keep_alive: impl Into<String>) -> Self {
        self.scroll = Some(keep_alive.into());
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_from(mut self, from: usize) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_ignore(mut self, status: u16) -> Self {
        self.ignore.push(status);
        self
    }

    pub fn ignores(&self, status: u16) -> bool {
        self.ignore.contains(&status)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(u16),
        Many(Vec<u16>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(status) => vec![status],
        OneOrMany::Many(statuses) => statuses,
    })
}

/// The indices a search runs over
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IndexTarget {
    /// Every index in the store
    #[default]
    All,
    Named(Vec<String>),
}

impl IndexTarget {
    /// Decodes `null`, a name, or a list of names
    pub fn from_json(value: Option<&JsonValue>) -> StoreResult<Self> {
        match value {
            None | Some(JsonValue::Null) => Ok(IndexTarget::All),
            Some(JsonValue::String(name)) => Ok(IndexTarget::from(name.as_str())),
            Some(JsonValue::Array(names)) => names
                .iter()
                .map(|name| {
                    name.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| StoreError::validation("Invalid param 'index'"))
                })
                .collect::<StoreResult<Vec<_>>>()
                .map(IndexTarget::Named),
            Some(_) => Err(StoreError::validation("Invalid param 'index'")),
        }
    }
}

impl From<&str> for IndexTarget {
    fn from(name: &str) -> Self {
        IndexTarget::Named(vec![name.to_string()])
    }
}

impl From<String> for IndexTarget {
    fn from(name: String) -> Self {
        IndexTarget::Named(vec![name])
    }
}

impl From<Vec<String>> for IndexTarget {
    fn from(names: Vec<String>) -> Self {
        IndexTarget::Named(names)
    }
}

impl From<Vec<&str>> for IndexTarget {
    fn from(names: Vec<&str>) -> Self {
        IndexTarget::Named(names.into_iter().map(str::to_string).collect())
    }
}

impl From<Option<&str>> for IndexTarget {
    fn from(name: Option<&str>) -> Self {
        name.map(IndexTarget::from).unwrap_or_default()
    }
}
