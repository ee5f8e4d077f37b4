use serde::{Deserialize, Serialize};

use crate::config::JiraConfig;
use crate::envelope::{OperationError, OperationResult};
use crate::runner::JiraRunner;

pub const DEFAULT_MAX_RESULTS: usize = 50;
pub const LIST_COLUMNS: &str = "KEY,SUMMARY,STATUS,ASSIGNEE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub jql: String,
    pub count: usize,
    pub issues: Vec<IssueSummary>,
}

fn list_args(jql: &str) -> Vec<String> {
    vec![
        "issue".to_string(),
        "list".to_string(),
        "--jql".to_string(),
        jql.to_string(),
        "--plain".to_string(),
        "--columns".to_string(),
        LIST_COLUMNS.to_string(),
        "--no-headers".to_string(),
    ]
}

/// Parse one tab-separated `KEY SUMMARY STATUS [ASSIGNEE]` row.
pub fn parse_issue_line(line: &str, config: &JiraConfig) -> Option<IssueSummary> {
    let parts: Vec<&str> = line.split('\t').map(str::trim).collect();
    if parts.len() < 3 || parts[0].is_empty() {
        return None;
    }
    let key = parts[0].to_string();
    Some(IssueSummary {
        url: config.browse_url(&key),
        key,
        summary: parts[1].to_string(),
        status: parts[2].to_string(),
        assignee: parts.get(3).copied().unwrap_or_default().to_string(),
    })
}

/// Parse at most `max_results` non-empty lines; short rows are skipped, not errors.
pub fn parse_issue_list(
    output: &str,
    max_results: usize,
    config: &JiraConfig,
) -> Vec<IssueSummary> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(max_results)
        .filter_map(|line| parse_issue_line(line, config))
        .collect()
}

pub fn search_issues(
    runner: &dyn JiraRunner,
    config: &JiraConfig,
    jql: &str,
    max_results: usize,
) -> OperationResult<SearchResults> {
    let result = runner.run(&list_args(jql));
    if !result.success {
        return Err(OperationError::new(result.error_text()));
    }
    let issues = parse_issue_list(result.output_text(), max_results, config);
    Ok(SearchResults {
        jql: jql.to_string(),
        count: issues.len(),
        issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_assignee_defaults_to_empty() {
        let config = JiraConfig::new("https://jira.test", None);
        let issue = parse_issue_line("OPS-1\tFix bug\tOpen", &config).expect("issue");
        assert_eq!(issue.assignee, "");
        assert_eq!(issue.url, "https://jira.test/browse/OPS-1");
    }

    #[test]
    fn short_rows_are_skipped() {
        let config = JiraConfig::default();
        assert_eq!(parse_issue_line("OPS-1\tonly summary", &config), None);
        assert_eq!(parse_issue_line("\tsummary\tOpen", &config), None);
    }

    #[test]
    fn fields_are_trimmed() {
        let config = JiraConfig::default();
        let issue = parse_issue_line(" OPS-3 \t Flaky test \t In Progress \t Ana ", &config)
            .expect("issue");
        assert_eq!(issue.key, "OPS-3");
        assert_eq!(issue.summary, "Flaky test");
        assert_eq!(issue.status, "In Progress");
        assert_eq!(issue.assignee, "Ana");
    }
}
