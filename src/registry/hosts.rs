//! Host specification normalization

use serde_json::Value as JsonValue;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 9200;
const DEFAULT_TLS_PORT: u16 = 443;

/// Result type for host parsing
pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid host specification: {0}")]
    InvalidHost(String),

    #[error("invalid port in host specification: {0}")]
    InvalidPort(String),
}

/// One host a client would connect to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostSpec {
    pub host: String,
    pub port: u16,
}

impl Default for HostSpec {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl HostSpec {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Registry key, `host:port`
    pub fn key(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses `host`, `host:port` or a URL such as `https://user:pw@host:port/path`
    pub fn parse(spec: &str) -> RegistryResult<Self> {
        let spec = spec.trim();
        let (default_port, rest) = match spec.split_once("://") {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("https") => (DEFAULT_TLS_PORT, rest),
            Some((_, rest)) => (DEFAULT_PORT, rest),
            None => (DEFAULT_PORT, spec),
        };

        let authority = rest.split('/').next().unwrap_or_default();
        let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse()
                    .map_err(|_| RegistryError::InvalidPort(spec.to_string()))?;
                (host, port)
            }
            None => (authority, default_port),
        };

        let host = if host.is_empty() { DEFAULT_HOST } else { host };
        Ok(Self::new(host, port))
    }

    fn from_json(entry: &JsonValue) -> RegistryResult<Self> {
        match entry {
            JsonValue::String(spec) => Self::parse(spec),
            JsonValue::Object(map) => {
                let host = match map.get("host") {
                    None | Some(JsonValue::Null) => DEFAULT_HOST,
                    Some(JsonValue::String(host)) => host.as_str(),
                    Some(other) => return Err(RegistryError::InvalidHost(other.to_string())),
                };
                let port = match map.get("port") {
                    None | Some(JsonValue::Null) => DEFAULT_PORT,
                    Some(JsonValue::Number(port)) => port
                        .as_u64()
                        .and_then(|port| u16::try_from(port).ok())
                        .ok_or_else(|| RegistryError::InvalidPort(port.to_string()))?,
                    Some(JsonValue::String(port)) => port
                        .parse()
                        .map_err(|_| RegistryError::InvalidPort(port.clone()))?,
                    Some(other) => return Err(RegistryError::InvalidPort(other.to_string())),
                };
                Ok(Self::new(host, port))
            }
            other => Err(RegistryError::InvalidHost(other.to_string())),
        }
    }
}

/// Normalizes the `hosts` argument of a client.
///
/// Accepts nothing, a single string or mapping, or a list of them. Nothing
/// (or an empty list) means `localhost:9200`.
pub fn normalize_hosts(hosts: Option<&JsonValue>) -> RegistryResult<Vec<HostSpec>> {
    let specs = match hosts {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(entries)) => entries
            .iter()
            .map(HostSpec::from_json)
            .collect::<RegistryResult<Vec<_>>>()?,
        Some(entry) => vec![HostSpec::from_json(entry)?],
    };

    if specs.is_empty() {
        return Ok(vec![HostSpec::default()]);
    }
    Ok(specs)
}
