#[cfg(any(test, feature = "testing"))]
use std::collections::VecDeque;
use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ClientCommand, JiraConfig, CLIENT_INSTALL_HINT};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunnerError {
    #[error("Command timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
    #[error("{client} CLI not found. Install with: {hint}")]
    NotFound { client: String, hint: &'static str },
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Normalized outcome of one client invocation.
///
/// `error` is set exactly when `success` is false. `output` is `None` only when the
/// process never produced a result (timeout, missing binary, spawn failure).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl CommandResult {
    pub fn ok(stdout: &str) -> Self {
        Self {
            success: true,
            output: Some(stdout.trim().to_string()),
            error: None,
        }
    }

    pub fn exit_failure(stdout: &str, stderr: &str) -> Self {
        Self {
            success: false,
            output: Some(stdout.trim().to_string()),
            error: Some(stderr.trim().to_string()),
        }
    }

    pub fn from_error(err: &RunnerError) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(err.to_string()),
        }
    }

    pub fn output_text(&self) -> &str {
        self.output.as_deref().unwrap_or_default()
    }

    pub fn error_text(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }
}

/// The single seam through which operations reach the external client.
pub trait JiraRunner: Send + Sync {
    fn run(&self, args: &[String]) -> CommandResult;
}

/// Runs the real client as a subprocess with a bounded wait. One attempt per call.
#[derive(Debug, Clone)]
pub struct CliRunner {
    command: ClientCommand,
    timeout: Duration,
}

struct Captured {
    success: bool,
    stdout: String,
    stderr: String,
}

impl CliRunner {
    pub fn new(command: ClientCommand, timeout: Duration) -> Self {
        Self { command, timeout }
    }

    pub fn from_config(config: &JiraConfig) -> Self {
        Self::new(config.command.clone(), config.timeout)
    }

    fn execute(&self, args: &[String]) -> Result<Captured, RunnerError> {
        let mut child = Command::new(&self.command.program)
            .args(&self.command.prefix_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| self.spawn_error(err))?;

        // Drain both pipes while waiting so a chatty client can't block on a full pipe.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(RunnerError::Timeout {
                        seconds: self.timeout.as_secs(),
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(err) => return Err(RunnerError::Unexpected(err.to_string())),
            }
        };

        // A background process started by the client can keep the pipes open after it
        // exits; the reads share the same deadline as the wait.
        Ok(Captured {
            success: status.success(),
            stdout: self.collect(&stdout, deadline)?,
            stderr: self.collect(&stderr, deadline)?,
        })
    }

    fn collect(&self, pipe: &Receiver<String>, deadline: Instant) -> Result<String, RunnerError> {
        match pipe.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(text) => Ok(text),
            Err(RecvTimeoutError::Timeout) => Err(RunnerError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
            Err(RecvTimeoutError::Disconnected) => Ok(String::new()),
        }
    }

    fn spawn_error(&self, err: io::Error) -> RunnerError {
        if err.kind() == io::ErrorKind::NotFound {
            RunnerError::NotFound {
                client: self.command.client_name(),
                hint: CLIENT_INSTALL_HINT,
            }
        } else {
            RunnerError::Unexpected(err.to_string())
        }
    }
}

impl JiraRunner for CliRunner {
    fn run(&self, args: &[String]) -> CommandResult {
        debug!(program = %self.command.program, ?args, "running jira client");
        match self.execute(args) {
            Ok(captured) if captured.success => CommandResult::ok(&captured.stdout),
            Ok(captured) => {
                let result = CommandResult::exit_failure(&captured.stdout, &captured.stderr);
                warn!(?args, error = result.error_text(), "jira client exited with failure");
                result
            }
            Err(err) => {
                warn!(?args, error = %err, "jira client did not complete");
                CommandResult::from_error(&err)
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut bytes = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut bytes);
        }
        let _ = tx.send(String::from_utf8_lossy(&bytes).to_string());
    });
    rx
}

/// Replays canned results in order and records every argument vector it receives.
///
/// Once the script runs out, each call succeeds with empty output.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: Mutex<VecDeque<CommandResult>>,
    calls: Mutex<Vec<Vec<String>>>,
}

#[cfg(any(test, feature = "testing"))]
impl ScriptedRunner {
    pub fn new(responses: impl IntoIterator<Item = CommandResult>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[cfg(any(test, feature = "testing"))]
impl JiraRunner for ScriptedRunner {
    fn run(&self, args: &[String]) -> CommandResult {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(args.to_vec());
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_else(|| CommandResult::ok(""))
    }
}
