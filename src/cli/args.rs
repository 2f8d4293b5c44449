//! CLI argument definitions using clap
//!
//! Commands:
//! - openmock start --config <path>
//! - openmock query --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// openmock - an in-process emulator of a search service
#[derive(Parser, Debug)]
#[command(name = "openmock")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve newline-delimited JSON requests from stdin
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./openmock.json")]
        config: PathBuf,
    },

    /// Handle a single request from stdin and exit
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./openmock.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
