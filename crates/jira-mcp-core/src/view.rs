use serde::{Deserialize, Serialize};

use crate::config::JiraConfig;
use crate::envelope::{OperationError, OperationResult};
use crate::runner::JiraRunner;

/// The client's plain-text detail view, returned as an opaque blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDetails {
    pub issue_key: String,
    pub details: String,
    pub url: String,
    pub success: bool,
}

pub fn view_issue(
    runner: &dyn JiraRunner,
    config: &JiraConfig,
    issue_key: &str,
) -> OperationResult<IssueDetails> {
    let result = runner.run(&[
        "issue".to_string(),
        "view".to_string(),
        issue_key.to_string(),
        "--plain".to_string(),
    ]);
    if !result.success {
        return Err(OperationError::new(result.error_text()));
    }
    Ok(IssueDetails {
        issue_key: issue_key.to_string(),
        details: result.output_text().to_string(),
        url: config.browse_url(issue_key),
        success: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::envelope;
    use crate::runner::{CommandResult, ScriptedRunner};

    #[test]
    fn view_returns_raw_details() {
        let runner = ScriptedRunner::new([CommandResult::ok("  Bug  Open\n\n# Summary\nline  \n")]);
        let details = view_issue(&runner, &JiraConfig::default(), "OPS-5").expect("view");
        assert_eq!(details.details, "Bug  Open\n\n# Summary\nline");
        assert!(details.success);
        assert_eq!(
            runner.calls(),
            vec![vec!["issue", "view", "OPS-5", "--plain"]]
        );
    }

    #[test]
    fn view_failure_is_error_only_envelope() {
        let runner = ScriptedRunner::new([CommandResult::exit_failure("", "issue does not exist")]);
        let result = view_issue(&runner, &JiraConfig::default(), "OPS-404");
        assert_eq!(
            envelope(&result),
            serde_json::json!({"error": "issue does not exist"})
        );
    }
}
