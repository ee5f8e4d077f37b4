use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::JiraConfig;
use crate::envelope::{OperationError, OperationResult};
use crate::issue_key::{IssueKeyExtractor, PatternKeyExtractor};
use crate::labels::apply_label;
use crate::runner::JiraRunner;

pub const PROJECT_REQUIRED_ERROR: &str =
    "Project required. Set JIRA_DEFAULT_PROJECT or pass project parameter";
pub const KEY_NOT_FOUND_ERROR: &str = "Could not extract issue key from output";

#[derive(Debug, Clone, Default)]
pub struct CreateIssueRequest {
    pub summary: String,
    pub issue_type: String,
    pub project: Option<String>,
    pub description: Option<String>,
    pub labels: Vec<String>,
}

/// The issue exists once this is returned; `warnings` lists follow-up steps that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub issue_key: String,
    pub url: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

fn create_args(project: &str, request: &CreateIssueRequest) -> Vec<String> {
    vec![
        "issue".to_string(),
        "create".to_string(),
        "-p".to_string(),
        project.to_string(),
        "-t".to_string(),
        request.issue_type.clone(),
        "-s".to_string(),
        request.summary.clone(),
        "--no-input".to_string(),
    ]
}

fn description_args(issue_key: &str, description: &str) -> Vec<String> {
    vec![
        "issue".to_string(),
        "edit".to_string(),
        issue_key.to_string(),
        "-b".to_string(),
        description.to_string(),
        "--no-input".to_string(),
    ]
}

pub fn create_issue(
    runner: &dyn JiraRunner,
    config: &JiraConfig,
    request: &CreateIssueRequest,
) -> OperationResult<CreatedIssue> {
    create_issue_with(runner, config, &PatternKeyExtractor::default(), request)
}

pub fn create_issue_with(
    runner: &dyn JiraRunner,
    config: &JiraConfig,
    extractor: &dyn IssueKeyExtractor,
    request: &CreateIssueRequest,
) -> OperationResult<CreatedIssue> {
    let project = config
        .resolve_project(request.project.as_deref())
        .ok_or_else(|| OperationError::new(PROJECT_REQUIRED_ERROR))?;

    let created = runner.run(&create_args(&project, request));
    if !created.success {
        let error = created.error_text().to_string();
        return Err(OperationError::with_output(error, created.output));
    }

    let issue_key = extractor.extract(created.output_text()).ok_or_else(|| {
        OperationError::with_output(KEY_NOT_FOUND_ERROR, created.output.clone())
    })?;
    info!(issue_key = %issue_key, project = %project, "issue created");

    // Creation is never rolled back; follow-up failures become warnings.
    let mut warnings = Vec::new();
    if let Some(description) = request.description.as_deref().filter(|d| !d.is_empty()) {
        let result = runner.run(&description_args(&issue_key, description));
        if !result.success {
            warn!(
                issue_key = %issue_key,
                error = result.error_text(),
                "description update failed"
            );
            warnings.push(format!("description failed: {}", result.error_text()));
        }
    }
    for label in request.labels.iter().filter(|label| !label.trim().is_empty()) {
        let outcome = apply_label(runner, &issue_key, label);
        if !outcome.success {
            warnings.push(format!(
                "label '{}' failed: {}",
                outcome.label,
                outcome.error.unwrap_or_default()
            ));
        }
    }

    Ok(CreatedIssue {
        url: config.browse_url(&issue_key),
        issue_key,
        success: true,
        warnings,
    })
}
