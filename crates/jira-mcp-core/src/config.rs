use std::path::Path;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_JIRA_URL: &str = "https://issues.myorg.com";
pub const DEFAULT_CLIENT_COMMAND: &str = "jira";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const CLIENT_INSTALL_HINT: &str = "brew install ankitpokhrel/jira-cli/jira-cli";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid client command {0:?}: {1}")]
    InvalidCommand(String, String),
    #[error("Client command is empty")]
    EmptyCommand,
    #[error("Timeout must be at least one second")]
    ZeroTimeout,
}

/// The external client invocation: a program plus arguments prepended to every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCommand {
    pub program: String,
    pub prefix_args: Vec<String>,
}

impl ClientCommand {
    /// Split a command line using shell-word rules, e.g. `jira --config ~/.jira.yml`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let parts = shell_words::split(raw)
            .map_err(|err| ConfigError::InvalidCommand(raw.to_string(), err.to_string()))?;
        let mut parts = parts.into_iter();
        let program = parts.next().ok_or(ConfigError::EmptyCommand)?;
        Ok(Self {
            program,
            prefix_args: parts.collect(),
        })
    }

    /// Whether the program resolves to an executable (PATH lookup for bare names).
    pub fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    /// Short name used in user-facing messages (`jira` for `/usr/local/bin/jira`).
    pub fn client_name(&self) -> String {
        Path::new(&self.program)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.clone())
    }
}

impl Default for ClientCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_CLIENT_COMMAND.to_string(),
            prefix_args: Vec::new(),
        }
    }
}

/// Process-wide settings, resolved once at startup and passed to every operation.
#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub default_project: Option<String>,
    pub command: ClientCommand,
    pub timeout: Duration,
}

impl JiraConfig {
    pub fn new(base_url: &str, default_project: Option<&str>) -> Self {
        let base_url = base_url.trim().trim_end_matches('/');
        let base_url = if base_url.is_empty() {
            DEFAULT_JIRA_URL
        } else {
            base_url
        };
        Self {
            base_url: base_url.to_string(),
            default_project: non_blank(default_project),
            command: ClientCommand::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_command(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.command = ClientCommand::parse(raw)?;
        Ok(self)
    }

    pub fn with_timeout_secs(mut self, seconds: u64) -> Result<Self, ConfigError> {
        if seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.timeout = Duration::from_secs(seconds);
        Ok(self)
    }

    pub fn browse_url(&self, issue_key: &str) -> String {
        format!("{}/browse/{}", self.base_url, issue_key)
    }

    /// Explicit project wins; otherwise the configured default, if any.
    pub fn resolve_project(&self, project: Option<&str>) -> Option<String> {
        non_blank(project).or_else(|| self.default_project.clone())
    }
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self::new(DEFAULT_JIRA_URL, None)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
