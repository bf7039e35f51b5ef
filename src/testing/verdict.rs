//! Verdict classification
//!
//! A zero exit code within the deadline is both necessary and sufficient
//! for a pass. Output content never affects the verdict.

use std::time::Duration;

use crate::common::{Error, Result};

use super::runner::{Completion, ExecutionResult};

/// Pass/fail outcome of one test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed(Failure),
}

/// Why a test case failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Killed after running past the deadline
    TimedOut { after: Duration },
    /// Exited with a nonzero code
    NonZeroExit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    /// Killed by a signal it raised itself or received from elsewhere
    Signaled {
        signal: i32,
        stdout: String,
        stderr: String,
    },
    /// The interpreter could not be launched
    SpawnFailed(String),
    /// The script itself could not be opened
    ScriptUnreadable(String),
    /// The harness lost track of the running process
    Interrupted(String),
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Verdict::Passed => None,
            Verdict::Failed(failure) => Some(failure),
        }
    }
}

/// Classify a finished test process
pub fn classify(result: &ExecutionResult, deadline: Duration) -> Verdict {
    match result.completion {
        Completion::TimedOut => Verdict::Failed(Failure::TimedOut { after: deadline }),
        Completion::Exited(0) => Verdict::Passed,
        Completion::Exited(code) => Verdict::Failed(Failure::NonZeroExit {
            code,
            stdout: decode(&result.stdout),
            stderr: decode(&result.stderr),
        }),
        Completion::Signaled(signal) => Verdict::Failed(Failure::Signaled {
            signal,
            stdout: decode(&result.stdout),
            stderr: decode(&result.stderr),
        }),
    }
}

/// Classify the runner's result, turning per-case errors into failures
///
/// Errors that are not tied to a single case are handed back to the caller.
pub fn classify_run(run: Result<ExecutionResult>, deadline: Duration) -> Result<Verdict> {
    let failure = match run {
        Ok(result) => return Ok(classify(&result, deadline)),
        Err(e @ Error::Spawn { .. }) => Failure::SpawnFailed(e.to_string()),
        Err(e @ Error::ScriptUnreadable { .. }) => Failure::ScriptUnreadable(e.to_string()),
        Err(e @ Error::Wait(_)) => Failure::Interrupted(e.to_string()),
        Err(e) => return Err(e),
    };
    Ok(Verdict::Failed(failure))
}

/// Captured output is not guaranteed to be UTF-8
fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

impl Failure {
    /// One-line diagnostic shown next to the error tag
    pub fn message(&self) -> String {
        match self {
            Failure::TimedOut { after } => format!("Timed out after {after:?}"),
            Failure::NonZeroExit { code, .. } => format!("Exited with error code {code}"),
            Failure::Signaled { signal, .. } => format!("Terminated by signal {signal}"),
            Failure::SpawnFailed(message)
            | Failure::ScriptUnreadable(message)
            | Failure::Interrupted(message) => message.clone(),
        }
    }

    /// Captured (stdout, stderr) worth dumping under the diagnostic
    pub fn output(&self) -> Option<(&str, &str)> {
        match self {
            Failure::NonZeroExit { stdout, stderr, .. } | Failure::Signaled { stdout, stderr, .. } => {
                Some((stdout.as_str(), stderr.as_str()))
            }
            _ => None,
        }
    }

    /// Short machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            Failure::TimedOut { .. } => "timeout",
            Failure::NonZeroExit { .. } => "nonzero_exit",
            Failure::Signaled { .. } => "signaled",
            Failure::SpawnFailed(_) => "spawn_error",
            Failure::ScriptUnreadable(_) => "unreadable",
            Failure::Interrupted(_) => "interrupted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;

    const DEADLINE: Duration = Duration::from_secs(2);

    fn result(completion: Completion, stdout: &[u8], stderr: &[u8]) -> ExecutionResult {
        ExecutionResult {
            stdout: stdout.to_vec(),
            stderr: stderr.to_vec(),
            completion,
        }
    }

    #[test]
    fn test_zero_exit_passes_regardless_of_output() {
        let verdict = classify(&result(Completion::Exited(0), b"FAIL", b"error!"), DEADLINE);
        assert_eq!(verdict, Verdict::Passed);
    }

    #[test]
    fn test_timeout_fails_without_output_dump() {
        let verdict = classify(&result(Completion::TimedOut, b"partial", b""), DEADLINE);
        let failure = verdict.failure().unwrap();
        assert_eq!(failure.message(), "Timed out after 2s");
        assert_eq!(failure.output(), None);
        assert_eq!(failure.kind(), "timeout");
    }

    #[test]
    fn test_nonzero_exit_message_contains_code_and_output() {
        let verdict = classify(&result(Completion::Exited(1), b"", b"boom"), DEADLINE);
        assert!(!verdict.passed());
        let failure = verdict.failure().unwrap();
        assert_eq!(failure.message(), "Exited with error code 1");
        assert_eq!(failure.output(), Some(("", "boom")));
    }

    #[test]
    fn test_negative_exit_code_still_fails() {
        let verdict = classify(&result(Completion::Exited(-1), b"", b""), DEADLINE);
        assert_eq!(verdict.failure().unwrap().message(), "Exited with error code -1");
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let verdict = classify(&result(Completion::Exited(2), b"\xff\xfeok", b""), DEADLINE);
        let (stdout, _) = verdict.failure().unwrap().output().unwrap();
        assert!(stdout.ends_with("ok"));
        assert!(stdout.contains('\u{FFFD}'));
    }

    #[test]
    fn test_signal_fails() {
        let verdict = classify(&result(Completion::Signaled(11), b"", b""), DEADLINE);
        assert_eq!(verdict.failure().unwrap().message(), "Terminated by signal 11");
    }

    #[test]
    fn test_spawn_error_becomes_failing_case() {
        let err = Error::spawn(Path::new("luaj"), io::Error::from(io::ErrorKind::NotFound));
        let verdict = classify_run(Err(err), DEADLINE).unwrap();
        let failure = verdict.failure().unwrap();
        assert_eq!(failure.kind(), "spawn_error");
        assert!(failure.message().contains("luaj"));
    }

    #[test]
    fn test_unreadable_script_becomes_failing_case() {
        let err = Error::ScriptUnreadable {
            path: "suite/a.lua".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        let verdict = classify_run(Err(err), DEADLINE).unwrap();
        assert!(verdict.failure().unwrap().message().starts_with("Failed to open file"));
    }

    #[test]
    fn test_run_level_errors_are_propagated() {
        let err = Error::Config("broken".to_string());
        assert!(classify_run(Err(err), DEADLINE).is_err());
    }
}
