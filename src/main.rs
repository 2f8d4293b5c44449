//! openmock CLI entry point
//!
//! Parses arguments, dispatches to the CLI module and exits non-zero with
//! the error on stderr when a command fails. All logic lives in `cli`.

use openmock::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
