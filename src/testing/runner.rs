//! Process runner
//!
//! Executes one test script as `<interpreter> <script>` in a fresh child
//! process and races it against a deadline. Exactly one of the two sides
//! wins: the timer is dropped when the child exits first, the child (and
//! its process group on Unix) is killed when the timer fires first.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{sleep, timeout};

use crate::common::{Error, Result};

use super::case::TestCase;

/// How long to wait for output pipes to close once the child is gone
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// How a test process finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The process exited on its own with this code
    Exited(i32),
    /// The process was killed by a signal the harness did not send
    Signaled(i32),
    /// The deadline elapsed and the harness killed the process
    TimedOut,
}

impl Completion {
    fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Completion::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Completion::Signaled(signal);
            }
        }

        Completion::Exited(-1)
    }

    /// Real exit code, if the process exited on its own
    pub fn code(&self) -> Option<i32> {
        match self {
            Completion::Exited(code) => Some(*code),
            _ => None,
        }
    }
}

/// Everything observed from one test process
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub completion: Completion,
}

/// Runs test cases against a fixed interpreter and deadline
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    interpreter: PathBuf,
    deadline: Duration,
}

impl ProcessRunner {
    pub fn new(interpreter: impl Into<PathBuf>, deadline: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            deadline,
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run a single case, checking first that its script can be opened
    pub async fn run(&self, case: &TestCase) -> Result<ExecutionResult> {
        ensure_readable(case.path()).await?;
        execute(&self.interpreter, case.path(), self.deadline).await
    }
}

/// Open the script once so an unreadable file is reported as such rather
/// than as whatever error the interpreter prints for it
async fn ensure_readable(path: &Path) -> Result<()> {
    tokio::fs::File::open(path)
        .await
        .map(drop)
        .map_err(|source| Error::ScriptUnreadable {
            path: path.to_path_buf(),
            source,
        })
}

/// Spawn `interpreter script` and wait for it to exit or for `deadline`
pub async fn execute(interpreter: &Path, script: &Path, deadline: Duration) -> Result<ExecutionResult> {
    let mut std_command = std::process::Command::new(interpreter);
    std_command
        .arg(script)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // Own process group so a timeout can take grandchildren down as well
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        std_command.process_group(0);
    }

    let mut command = Command::from(std_command);
    command.kill_on_drop(true);

    let mut child = command.spawn().map_err(|e| Error::spawn(interpreter, e))?;
    let pid = child.id();
    tracing::debug!(?pid, script = %script.display(), "Spawned test process");

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let outcome = tokio::select! {
        status = child.wait() => status.map(Completion::from_status).map_err(Error::Wait),
        _ = sleep(deadline) => Ok(Completion::TimedOut),
    };

    match &outcome {
        Ok(Completion::Exited(_)) | Ok(Completion::Signaled(_)) => {
            // Whatever the script left running in its group goes with it
            kill_group(pid);
        }
        Ok(Completion::TimedOut) => {
            tracing::debug!(?pid, ?deadline, "Deadline elapsed, killing test process");
            terminate(&mut child, pid).await;
        }
        Err(e) => {
            tracing::warn!(?pid, error = %e, "Lost track of test process, killing it");
            terminate(&mut child, pid).await;
        }
    }

    let completion = outcome?;
    let (stdout, stderr) = collect_streams(stdout, stderr, pid).await;
    tracing::debug!(?pid, ?completion, "Test process finished");

    Ok(ExecutionResult {
        stdout,
        stderr,
        completion,
    })
}

/// Read a child stream to the end on a background task
fn drain<R>(stream: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            if let Err(e) = stream.read_to_end(&mut buf).await {
                tracing::warn!(error = %e, "Failed to read test process output");
            }
        }
        buf
    })
}

/// Wait for both reader tasks. If the pipes stay open after the child is
/// gone, something outside its group still holds them: kill the group once
/// more and give it one more grace period before reporting the streams empty.
async fn collect_streams(
    stdout: JoinHandle<Vec<u8>>,
    stderr: JoinHandle<Vec<u8>>,
    pid: Option<u32>,
) -> (Vec<u8>, Vec<u8>) {
    let aborts = [stdout.abort_handle(), stderr.abort_handle()];
    let mut joined = Box::pin(async move { tokio::join!(stdout, stderr) });

    let (out, err) = match timeout(DRAIN_GRACE, &mut joined).await {
        Ok(streams) => streams,
        Err(_) => {
            tracing::warn!(?pid, "Output still open after test process ended, killing its process group");
            kill_group(pid);
            match timeout(DRAIN_GRACE, joined).await {
                Ok(streams) => streams,
                Err(_) => {
                    tracing::warn!(?pid, "Giving up on test process output");
                    for handle in aborts {
                        handle.abort();
                    }
                    return (Vec::new(), Vec::new());
                }
            }
        }
    };

    (stream_bytes(out), stream_bytes(err))
}

fn stream_bytes(joined: std::result::Result<Vec<u8>, JoinError>) -> Vec<u8> {
    joined.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Output reader task failed");
        Vec::new()
    })
}

/// Kill the child and reap it
async fn terminate(child: &mut Child, pid: Option<u32>) {
    kill_group(pid);
    if let Err(e) = child.kill().await {
        tracing::warn!(?pid, error = %e, "Failed to kill test process");
    }
}

#[cfg(unix)]
fn kill_group(pid: Option<u32>) {
    let Some(pid) = pid else { return };
    // The child was spawned as leader of its own group, so pgid == pid
    let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
    if rc != 0 {
        tracing::debug!(
            pid,
            error = %std::io::Error::last_os_error(),
            "Process group already gone"
        );
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: Option<u32>) {}
