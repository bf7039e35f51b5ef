//! Error types for the script harness
//!
//! Errors fall into two groups. Per-case errors (spawn, unreadable script,
//! lost child) are turned into failing verdicts by the walker and never stop
//! a run. Discovery and configuration errors abort the run.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Per-case Errors ===
    #[error("Failed to launch interpreter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to open file '{}': {source}", path.display())]
    ScriptUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Lost contact with test process: {0}")]
    Wait(#[source] io::Error),

    // === Discovery Errors ===
    #[error("Cannot list directory '{}': {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a spawn error for the given interpreter
    pub fn spawn(program: &Path, source: io::Error) -> Self {
        Self::Spawn {
            program: program.display().to_string(),
            source,
        }
    }

    /// Create a discovery error for a directory that could not be listed
    pub fn discovery(path: &Path, source: io::Error) -> Self {
        Self::Discovery {
            path: path.to_path_buf(),
            source,
        }
    }
}
