use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of a finished child process.
#[derive(Debug)]
pub struct ProcessOutput {
    /// Exit status of the child.
    pub status: ExitStatus,
    /// Everything written to stdout.
    pub stdout: Vec<u8>,
    /// Everything written to stderr.
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    /// `true` for a zero exit status.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Lossy UTF-8 stdout.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Trimmed stderr, for error messages.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Why [`run_with_timeout`] produced no output.
#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    /// The executable could not be started.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        /// Program as passed to [`Command::new`].
        program: String,
        /// OS error from spawning.
        source: std::io::Error,
    },

    /// The deadline passed; the child was killed and reaped.
    #[error("'{program}' timed out after {:.1}s and was killed", .timeout.as_secs_f64())]
    TimedOut {
        /// Program as passed to [`Command::new`].
        program: String,
        /// The budget that elapsed.
        timeout: Duration,
    },

    /// Polling the child failed; it was killed and reaped.
    #[error("failed to wait for '{program}': {source}")]
    Wait {
        /// Program as passed to [`Command::new`].
        program: String,
        /// OS error from polling.
        source: std::io::Error,
    },
}

/// Run `cmd` to completion, capturing stdout and stderr, killing it once `timeout` elapses.
///
/// Both pipes are drained on their own threads so a chatty child cannot block on a full pipe.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<ProcessOutput, ProcessError> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: program.clone(),
        source,
    })?;
    let stdout_drain = drain(child.stdout.take());
    let stderr_drain = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                reap(&mut child);
                tracing::debug!(program = %program, "killed child after timeout");
                return Err(ProcessError::TimedOut { program, timeout });
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(source) => {
                reap(&mut child);
                return Err(ProcessError::Wait { program, source });
            }
        }
    };

    Ok(ProcessOutput {
        status,
        stdout: join(stdout_drain),
        stderr: join(stderr_drain),
    })
}

/// Kill `child` and wait for it so no zombie is left behind.
fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut bytes = Vec::new();
            let _ = pipe.read_to_end(&mut bytes);
            bytes
        })
    })
}

fn join(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/process.rs"]
mod tests;
