use serde::{Deserialize, Serialize};

use crate::config::JiraConfig;
use crate::runner::JiraRunner;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelResult {
    pub label: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelsApplied {
    pub issue_key: String,
    pub results: Vec<LabelResult>,
    pub url: String,
}

pub(crate) fn label_args(issue_key: &str, label: &str) -> Vec<String> {
    vec![
        "issue".to_string(),
        "edit".to_string(),
        issue_key.to_string(),
        "-l".to_string(),
        label.to_string(),
        "--no-input".to_string(),
    ]
}

/// Apply one label with its own client call.
pub fn apply_label(runner: &dyn JiraRunner, issue_key: &str, label: &str) -> LabelResult {
    let label = label.trim();
    let result = runner.run(&label_args(issue_key, label));
    LabelResult {
        label: label.to_string(),
        success: result.success,
        error: if result.success { None } else { result.error },
    }
}

/// Apply each label in order; a failing label never stops the ones after it.
pub fn add_labels(
    runner: &dyn JiraRunner,
    config: &JiraConfig,
    issue_key: &str,
    labels: &[String],
) -> LabelsApplied {
    let results = labels
        .iter()
        .filter(|label| !label.trim().is_empty())
        .map(|label| apply_label(runner, issue_key, label))
        .collect();
    LabelsApplied {
        issue_key: issue_key.to_string(),
        results,
        url: config.browse_url(issue_key),
    }
}
