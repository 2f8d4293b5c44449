//! CLI command implementations
//!
//! Both commands load the configuration, apply its log level, seed the
//! default store from the fixtures file and then answer requests.

use std::path::Path;

use crate::api::ApiHandler;
use crate::observability::{log_event, log_event_with_fields, Event, Logger};
use crate::registry::Registry;

use super::args::{Cli, Command};
use super::config::{load_fixtures, seed, Config};
use super::errors::{CliError, CliResult};
use super::io::{read_request, read_requests, write_error, write_json};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args().command)
}

/// Run a parsed command
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Start { config } => start(&config),
        Command::Query { config } => query(&config),
    }
}

/// Serve newline-delimited requests until EOF
///
/// Request errors are answered in-band; an unreadable input line ends the
/// session with an error envelope.
pub fn start(config_path: &Path) -> CliResult<()> {
    let mut handler = boot(config_path)?;
    log_event(Event::SessionStart);

    let mut handled = 0usize;
    for line in read_requests() {
        match line {
            Ok(request) => {
                let response = handler.handle(&request);
                write_json(&response.to_json())?;
                handled += 1;
            }
            Err(e) => {
                write_error(e.code_str(), e.message())?;
                break;
            }
        }
    }

    log_event_with_fields(Event::SessionComplete, &[("requests", &handled.to_string())]);
    Ok(())
}

/// Handle one request and exit
pub fn query(config_path: &Path) -> CliResult<()> {
    let mut handler = boot(config_path)?;

    let request = read_request()?;
    let response = handler.handle(&request);
    write_json(&response.to_json())?;

    log_event_with_fields(Event::SessionComplete, &[("requests", "1")]);
    Ok(())
}

/// Load config, set the log level and seed fixtures
pub fn boot(config_path: &Path) -> CliResult<ApiHandler> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("host", &config.host),
            ("path", &config_path.display().to_string()),
            ("port", &config.port.to_string()),
        ],
    );

    let mut handler = ApiHandler::new(Registry::new(), config.default_host());

    if let Some(path) = &config.fixtures {
        let fixtures = load_fixtures(path)?;
        let store = handler
            .registry_mut()
            .connect(std::slice::from_ref(&config.default_host()));
        let written = seed(&mut store.borrow_mut(), fixtures)
            .map_err(|e| CliError::fixture_error(e.to_string()))?;
        log_event_with_fields(
            Event::FixturesLoaded,
            &[
                ("documents", &written.to_string()),
                ("path", &path.display().to_string()),
            ],
        );
    }

    Ok(handler)
}
