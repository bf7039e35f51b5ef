//! Test case identity and run totals

use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A single script file discovered by the walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    path: PathBuf,
}

impl TestCase {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name of the directory holding the script
    pub fn suite(&self) -> String {
        self.path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its extension, underscores shown as spaces
    pub fn display_name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().replace('_', " "))
            .unwrap_or_default()
    }
}

/// Number of cases run and passed under some directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    pub total: usize,
    pub passed: usize,
}

impl RunTotals {
    /// Count one case
    pub fn record(&mut self, passed: bool) {
        self.total += 1;
        if passed {
            self.passed += 1;
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.passed
    }

    /// True when nothing failed, including an empty run
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// Process exit status for CI gating
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}

impl AddAssign for RunTotals {
    fn add_assign(&mut self, other: Self) {
        self.total += other.total;
        self.passed += other.passed;
    }
}
