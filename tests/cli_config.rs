//! CLI Configuration Tests
//!
//! Config files and fixtures are written to a temporary directory and
//! loaded through `boot`, the same path `start` and `query` take.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;

use openmock::cli::{boot, load_fixtures, CliErrorCode, Config};

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

// =============================================================================
// Config Loading
// =============================================================================

/// Test: An empty config file yields the defaults.
#[test]
fn test_empty_config() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "openmock.json", "{}");

    let config = Config::load(&path).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.default_host().key(), "localhost:9200");
}

/// Test: Invalid configs are reported as config errors.
#[test]
fn test_invalid_configs() {
    let dir = TempDir::new().unwrap();

    for (name, content) in [
        ("syntax.json", "{not json"),
        ("level.json", r#"{"log_level": "loud"}"#),
        ("port.json", r#"{"port": 0}"#),
        ("host.json", r#"{"host": "  "}"#),
    ] {
        let path = write(dir.path(), name, content);
        let err = Config::load(&path).unwrap_err();
        assert_eq!(*err.code(), CliErrorCode::ConfigError, "config {}", name);
    }

    let err = Config::load(&dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.code_str(), "OPENMOCK_CLI_CONFIG_ERROR");
}

/// Test: Relative fixture paths resolve next to the config file.
#[test]
fn test_relative_fixture_path() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "openmock.json", r#"{"fixtures": "docs.json"}"#);

    let config = Config::load(&path).unwrap();
    assert_eq!(config.fixtures, Some(dir.path().join("docs.json")));
}

// =============================================================================
// Fixtures
// =============================================================================

/// Test: Fixture entries may be bare sources or carry an id.
#[test]
fn test_fixture_forms() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "docs.json",
        &json!({
            "logs": [
                {"msg": "bare"},
                {"_id": 7, "_source": {"msg": "with id"}}
            ]
        })
        .to_string(),
    );

    let fixtures = load_fixtures(&path).unwrap();
    let logs = &fixtures["logs"];
    assert_eq!(logs[0].id, None);
    assert_eq!(logs[0].source, json!({"msg": "bare"}));
    assert_eq!(logs[1].id.as_deref(), Some("7"));
}

/// Test: A non-object fixture entry is a fixture error.
#[test]
fn test_fixture_must_be_object() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "docs.json", r#"{"logs": [1, 2]}"#);

    let err = load_fixtures(&path).unwrap_err();
    assert_eq!(*err.code(), CliErrorCode::FixtureError);
}

/// Test: boot seeds fixtures into the configured host's store.
#[test]
fn test_boot_seeds_fixtures() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "docs.json",
        &json!({"logs": [{"_id": "1", "_source": {"msg": "seeded"}}, {"msg": "other"}]}).to_string(),
    );
    let path = write(
        dir.path(),
        "openmock.json",
        r#"{"host": "search", "port": 9300, "fixtures": "docs.json"}"#,
    );

    let mut handler = boot(&path).unwrap();

    let response = handler.handle(r#"{"op": "get", "index": "logs", "id": "1"}"#);
    assert_eq!(response.data().unwrap()["_source"]["msg"], "seeded");

    let counted = handler.handle(r#"{"op": "count", "hosts": "search:9300", "index": "logs"}"#);
    assert_eq!(counted.data().unwrap()["count"], 2);

    let elsewhere = handler.handle(r#"{"op": "indices.exists", "hosts": "localhost", "index": "logs"}"#);
    assert_eq!(elsewhere.data(), Some(&json!(false)));
}
