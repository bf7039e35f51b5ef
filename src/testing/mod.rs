//! Conformance test execution
//!
//! The walker discovers scripts, the runner executes each one against the
//! interpreter under test, the verdict module decides pass/fail and the
//! reporter renders every step.

mod case;
mod report;
mod runner;
mod verdict;
mod walker;

use std::io::Write;

pub use case::{RunTotals, TestCase};
pub use report::Reporter;
pub use runner::{execute, Completion, ExecutionResult, ProcessRunner};
pub use verdict::{classify, classify_run, Failure, Verdict};
pub use walker::SuiteWalker;

use crate::common::{HarnessConfig, Result};

/// Run every suite under the configured root and print the summary
pub async fn run_suites<W: Write>(config: &HarnessConfig, reporter: &mut Reporter<W>) -> Result<RunTotals> {
    let totals = SuiteWalker::new(config, reporter).run(&config.root).await?;
    reporter.summary(&totals)?;
    Ok(totals)
}
