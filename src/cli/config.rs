//! Configuration file and fixtures
//!
//! ```json
//! {"log_level": "info", "host": "localhost", "port": 9200, "fixtures": "./fixtures.json"}
//! ```
//!
//! Every field is optional. A fixtures file maps index names to lists of
//! documents; an entry is either a bare source or `{"_id": ..., "_source": ...}`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::errors::{CliError, CliResult};
use crate::observability::Severity;
use crate::registry::{HostSpec, DEFAULT_HOST, DEFAULT_PORT};
use crate::store::{FakeSearch, StoreResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Minimum log severity (optional, default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Host requests without `hosts` are routed to (optional, default "localhost")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port requests without `hosts` are routed to (optional, default 9200)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Documents preloaded into the default store (optional)
    #[serde(default)]
    pub fixtures: Option<PathBuf>,
}

fn default_log_level() -> String {
    "warn".to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            host: default_host(),
            port: default_port(),
            fixtures: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        // Relative fixture paths are resolved against the config file
        if let (Some(fixtures), Some(dir)) = (&config.fixtures, path.parent()) {
            if fixtures.is_relative() {
                config.fixtures = Some(dir.join(fixtures));
            }
        }

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        self.severity()?;

        if self.host.trim().is_empty() {
            return Err(CliError::config_error("host must not be empty"));
        }

        if self.port == 0 {
            return Err(CliError::config_error("port must be > 0"));
        }

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level.parse().map_err(|_| {
            CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be one of trace, info, warn, error, fatal.",
                self.log_level
            ))
        })
    }

    /// Host requests without `hosts` are routed to
    pub fn default_host(&self) -> HostSpec {
        HostSpec::new(self.host.clone(), self.port)
    }
}

/// One preloaded document
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub id: Option<String>,
    pub source: JsonValue,
}

impl Fixture {
    fn from_json(entry: JsonValue) -> CliResult<Self> {
        let JsonValue::Object(mut map) = entry else {
            return Err(CliError::fixture_error(format!(
                "fixture documents must be objects, got {}",
                entry
            )));
        };

        let Some(source) = map.remove("_source") else {
            return Ok(Self {
                id: None,
                source: JsonValue::Object(map),
            });
        };
        let id = match map.remove("_id") {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(id)) => Some(id),
            Some(JsonValue::Number(id)) => Some(id.to_string()),
            Some(other) => {
                return Err(CliError::fixture_error(format!("invalid fixture _id {}", other)))
            }
        };
        Ok(Self { id, source })
    }
}

/// Fixture documents by index
pub type Fixtures = BTreeMap<String, Vec<Fixture>>;

/// Reads a fixtures file
pub fn load_fixtures(path: &Path) -> CliResult<Fixtures> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::fixture_error(format!("Failed to read fixtures: {}", e)))?;
    let parsed: BTreeMap<String, Vec<JsonValue>> = serde_json::from_str(&content)
        .map_err(|e| CliError::fixture_error(format!("Invalid fixtures JSON: {}", e)))?;

    parsed
        .into_iter()
        .map(|(index, entries)| {
            let fixtures = entries
                .into_iter()
                .map(Fixture::from_json)
                .collect::<CliResult<Vec<_>>>()?;
            Ok((index, fixtures))
        })
        .collect()
}

/// Indexes every fixture; returns the number of documents written
pub fn seed(store: &mut FakeSearch, fixtures: Fixtures) -> StoreResult<usize> {
    let mut written = 0;
    for (index, documents) in fixtures {
        store.indices().create(&index)?;
        for fixture in documents {
            store.index(&index, fixture.source, fixture.id.as_deref())?;
            written += 1;
        }
    }
    Ok(written)
}
