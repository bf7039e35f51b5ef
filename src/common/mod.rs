//! Common utilities shared by the harness components

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ColorChoice, HarnessConfig, OutputFormat};
pub use error::{Error, Result};
