//! Suite walker
//!
//! Recursively discovers test scripts under a root directory and runs them
//! one at a time. Each directory level counts its own totals and hands them
//! back to its parent.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::common::{Error, HarnessConfig, Result};

use super::case::{RunTotals, TestCase};
use super::report::Reporter;
use super::runner::ProcessRunner;
use super::verdict::classify_run;

type WalkFuture<'a> = Pin<Box<dyn Future<Output = Result<RunTotals>> + 'a>>;

/// Walks a suite tree, running every script it finds
pub struct SuiteWalker<'r, W: Write> {
    config: &'r HarnessConfig,
    runner: ProcessRunner,
    reporter: &'r mut Reporter<W>,
}

impl<'r, W: Write> SuiteWalker<'r, W> {
    pub fn new(config: &'r HarnessConfig, reporter: &'r mut Reporter<W>) -> Self {
        Self {
            config,
            runner: ProcessRunner::new(&config.interpreter, config.timeout),
            reporter,
        }
    }

    /// Run every script under `root`
    pub async fn run(&mut self, root: &Path) -> Result<RunTotals> {
        self.walk(root).await
    }

    fn walk<'a>(&'a mut self, dir: &'a Path) -> WalkFuture<'a> {
        Box::pin(async move {
            let mut totals = RunTotals::default();

            for path in list_dir(dir).await? {
                if is_dir(&path).await {
                    totals += self.walk(&path).await?;
                } else if self.config.is_script(&path) {
                    let passed = self.run_case(TestCase::new(path)).await?;
                    totals.record(passed);
                }
            }

            tracing::debug!(
                dir = %dir.display(),
                total = totals.total,
                passed = totals.passed,
                "Finished directory"
            );
            Ok(totals)
        })
    }

    /// Run one case and report it; returns whether it passed
    async fn run_case(&mut self, case: TestCase) -> Result<bool> {
        self.reporter.case_started(&case)?;
        let run = self.runner.run(&case).await;
        let verdict = classify_run(run, self.runner.deadline())?;
        self.reporter.case_finished(&case, &verdict)?;
        Ok(verdict.passed())
    }
}

/// Directory entries sorted by name so reports come out in a stable order
async fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| Error::discovery(dir, e))?;
    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::discovery(dir, e))?
    {
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

/// Follows symlinks; a dangling link is treated as a plain file
async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}
