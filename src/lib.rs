//! Script conformance harness
//!
//! Discovers script files organized into suites, runs each one in a fresh
//! interpreter process under a deadline and reports an aggregate verdict.

pub mod cli;
pub mod commands;
pub mod common;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, HarnessConfig, Result};
pub use testing::{RunTotals, TestCase, Verdict};
