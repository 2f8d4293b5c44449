//! Line-oriented JSON I/O
//!
//! - Input: one JSON request per line on stdin
//! - Output: one JSON response per line on stdout
//! - UTF-8 only

use std::io::{self, BufRead, Write};

use super::errors::{CliError, CliResult};

/// Read a single request line from stdin
pub fn read_request() -> CliResult<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    if line.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(line)
}

/// Read request lines from stdin until EOF, skipping blank lines
pub fn read_requests() -> impl Iterator<Item = CliResult<String>> {
    io::stdin()
        .lock()
        .lines()
        .filter(|line| !matches!(line, Ok(line) if line.trim().is_empty()))
        .map(|line| line.map_err(CliError::from))
}

/// Write an error envelope to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write a raw JSON string to stdout
pub fn write_json(json_str: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", json_str)?;
    stdout.flush()?;

    Ok(())
}
