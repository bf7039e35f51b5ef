//! Reporter
//!
//! Pure presentation: renders per-case status lines and the final summary.
//! Whether escape codes are written is decided once, before the reporter is
//! built, and never re-checked here.

use std::io::{self, Write};

use colored::{Color, Colorize};
use serde::Serialize;

use crate::common::{OutputFormat, Result};

use super::case::{RunTotals, TestCase};
use super::verdict::Verdict;

/// Writes harness results to a stream
pub struct Reporter<W: Write> {
    out: W,
    color: bool,
    format: OutputFormat,
}

/// One line of JSON output per test case
#[derive(Serialize)]
struct CaseRecord<'a> {
    suite: String,
    name: String,
    path: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stdout: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stderr: Option<&'a str>,
}

/// Final JSON line
#[derive(Serialize)]
struct SummaryRecord {
    #[serde(flatten)]
    totals: RunTotals,
    failed: usize,
    success: bool,
}

impl Reporter<io::Stdout> {
    /// Reporter on the process's standard output
    pub fn stdout(color: bool, format: OutputFormat) -> Self {
        Self::new(io::stdout(), color, format)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, color: bool, format: OutputFormat) -> Self {
        // JSON consumers never want escape codes
        let color = color && format == OutputFormat::Text;
        Self { out, color, format }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn tag(&self, label: &str, color: Color) -> String {
        let tag = format!("[{label}]");
        if self.color {
            tag.color(color).to_string()
        } else {
            tag
        }
    }

    /// Announce a case that is about to run
    pub fn case_started(&mut self, case: &TestCase) -> Result<()> {
        if self.format == OutputFormat::Text {
            let tag = self.tag("Test", Color::Blue);
            writeln!(
                self.out,
                "{tag} Testing {} -> {}",
                case.suite(),
                case.display_name()
            )?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Report the verdict of a case
    pub fn case_finished(&mut self, case: &TestCase, verdict: &Verdict) -> Result<()> {
        match self.format {
            OutputFormat::Text => self.write_verdict_text(verdict),
            OutputFormat::Json => self.write_verdict_json(case, verdict),
        }
    }

    fn write_verdict_text(&mut self, verdict: &Verdict) -> Result<()> {
        match verdict.failure() {
            None => {
                let tag = self.tag("Passed", Color::Green);
                writeln!(self.out, "{tag}")?;
            }
            Some(failure) => {
                let tag = self.tag("Error", Color::Red);
                writeln!(self.out, "{tag} {}", failure.message())?;
                if let Some((stdout, stderr)) = failure.output() {
                    for stream in [stdout, stderr] {
                        if !stream.is_empty() {
                            writeln!(self.out, "{}", stream.trim_end_matches(['\r', '\n']))?;
                        }
                    }
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn write_verdict_json(&mut self, case: &TestCase, verdict: &Verdict) -> Result<()> {
        let failure = verdict.failure();
        let output = failure.and_then(|f| f.output());
        let record = CaseRecord {
            suite: case.suite(),
            name: case.display_name(),
            path: case.path().display().to_string(),
            status: if verdict.passed() { "passed" } else { "failed" },
            failure: failure.map(|f| f.kind()),
            message: failure.map(|f| f.message()),
            stdout: output.map(|(stdout, _)| stdout).filter(|s| !s.is_empty()),
            stderr: output.map(|(_, stderr)| stderr).filter(|s| !s.is_empty()),
        };
        serde_json::to_writer(&mut self.out, &record)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    /// Final summary for the whole run
    pub fn summary(&mut self, totals: &RunTotals) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                if totals.total > 0 {
                    writeln!(self.out)?;
                }
                if totals.all_passed() {
                    let tag = self.tag("Success", Color::Green);
                    writeln!(self.out, "{tag} All tests passed!")?;
                } else {
                    let tag = self.tag("Failure", Color::Red);
                    writeln!(
                        self.out,
                        "{tag} {} of {} tests passed",
                        totals.passed, totals.total
                    )?;
                }
            }
            OutputFormat::Json => {
                let record = SummaryRecord {
                    totals: *totals,
                    failed: totals.failed(),
                    success: totals.all_passed(),
                };
                serde_json::to_writer(&mut self.out, &record)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}
