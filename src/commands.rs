//! Command-line arguments
//!
//! Defines the clap interface for the harness.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::common::config::{ColorChoice, DEFAULT_EXTENSION};

#[derive(Parser, Debug)]
#[command(name = "script-harness", about = "Run script conformance suites against an interpreter")]
#[command(version, long_about = None)]
pub struct Cli {
    /// Directory scanned recursively for test scripts
    pub root: PathBuf,

    /// Interpreter under test, invoked as `<interpreter> <script>`
    pub interpreter: PathBuf,

    /// Seconds each test may run before it is killed [default: 2]
    #[arg(long, value_name = "SECS", value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Extension that marks a file as a test script (case-sensitive)
    #[arg(long, value_name = "EXT", default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// When to color the report
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Emit one JSON object per line instead of text
    #[arg(long)]
    pub json: bool,
}

/// Parse a positive, possibly fractional, number of seconds
fn parse_timeout(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number of seconds"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("timeout must be a positive number of seconds, got '{value}'"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}
