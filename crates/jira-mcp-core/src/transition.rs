use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::JiraConfig;
use crate::runner::JiraRunner;

pub const CLOSED_STATE: &str = "Closed";
pub const DEFAULT_CLOSE_RESOLUTION: &str = "Duplicate";

#[derive(Debug, Clone, Default)]
pub struct TransitionRequest {
    pub issue_key: String,
    pub state: String,
    pub resolution: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub issue_key: String,
    pub state: String,
    pub resolution: Option<String>,
    pub success: bool,
    pub error: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCloseOutcome {
    pub total: usize,
    pub results: Vec<TransitionOutcome>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

fn move_args(request: &TransitionRequest) -> Vec<String> {
    let mut args = vec![
        "issue".to_string(),
        "move".to_string(),
        request.issue_key.clone(),
        request.state.clone(),
        "--no-input".to_string(),
    ];
    if let Some(resolution) = non_empty(&request.resolution) {
        args.extend(["-R".to_string(), resolution.to_string()]);
    }
    if let Some(comment) = non_empty(&request.comment) {
        args.extend(["--comment".to_string(), comment.to_string()]);
    }
    args
}

pub fn transition_issue(
    runner: &dyn JiraRunner,
    config: &JiraConfig,
    request: &TransitionRequest,
) -> TransitionOutcome {
    let result = runner.run(&move_args(request));
    TransitionOutcome {
        issue_key: request.issue_key.clone(),
        state: request.state.clone(),
        resolution: non_empty(&request.resolution).map(str::to_string),
        success: result.success,
        error: if result.success { None } else { result.error },
        url: config.browse_url(&request.issue_key),
    }
}

/// Close every key in order with a shared resolution and comment.
///
/// Each key is attempted regardless of earlier failures; outcomes keep input order.
pub fn batch_close_issues(
    runner: &dyn JiraRunner,
    config: &JiraConfig,
    issue_keys: &[String],
    resolution: &str,
    comment: Option<&str>,
) -> BatchCloseOutcome {
    let results: Vec<TransitionOutcome> = issue_keys
        .iter()
        .map(|key| key.trim())
        .filter(|key| !key.is_empty())
        .map(|key| {
            transition_issue(
                runner,
                config,
                &TransitionRequest {
                    issue_key: key.to_string(),
                    state: CLOSED_STATE.to_string(),
                    resolution: Some(resolution.to_string()),
                    comment: comment.map(str::to_string),
                },
            )
        })
        .collect();
    let failed = results.iter().filter(|outcome| !outcome.success).count();
    info!(total = results.len(), failed, "batch close finished");
    BatchCloseOutcome {
        total: results.len(),
        results,
    }
}
