use serde::{Deserialize, Serialize};

use crate::runner::JiraRunner;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOutcome {
    pub inward_issue: String,
    pub outward_issue: String,
    pub link_type: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Link two issues. Keys and link type are passed through; the client validates them.
pub fn link_issues(
    runner: &dyn JiraRunner,
    inward_issue: &str,
    outward_issue: &str,
    link_type: &str,
) -> LinkOutcome {
    let result = runner.run(&[
        "issue".to_string(),
        "link".to_string(),
        inward_issue.to_string(),
        outward_issue.to_string(),
        link_type.to_string(),
    ]);
    LinkOutcome {
        inward_issue: inward_issue.to_string(),
        outward_issue: outward_issue.to_string(),
        link_type: link_type.to_string(),
        success: result.success,
        error: if result.success { None } else { result.error },
    }
}
