//! Command-line interface
//!
//! - start: serve newline-delimited JSON requests from stdin
//! - query: handle a single request and exit

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{boot, query, run, run_command, start};
pub use config::{load_fixtures, seed, Config, Fixture, Fixtures};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, read_requests, write_error, write_json};
