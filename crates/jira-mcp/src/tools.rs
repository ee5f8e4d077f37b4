use std::sync::Arc;

use async_trait::async_trait;
use rust_mcp_sdk::macros::{mcp_tool, JsonSchema};
use rust_mcp_sdk::schema::{
    schema_utils::CallToolError, CallToolRequestParams, CallToolResult, ListToolsResult,
    PaginatedRequestParams, RpcError, TextContent,
};
use rust_mcp_sdk::tool_box;
use rust_mcp_sdk::{mcp_server::ServerHandler, McpServer};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::version;

use jira_mcp_core::config::JiraConfig;
use jira_mcp_core::create::{create_issue, CreateIssueRequest};
use jira_mcp_core::envelope::{envelope, OperationResult};
use jira_mcp_core::labels::add_labels;
use jira_mcp_core::link::link_issues;
use jira_mcp_core::list::parse_list_string;
use jira_mcp_core::runner::JiraRunner;
use jira_mcp_core::search::{search_issues, DEFAULT_MAX_RESULTS};
use jira_mcp_core::transition::{
    batch_close_issues, transition_issue, TransitionRequest, DEFAULT_CLOSE_RESOLUTION,
};
use jira_mcp_core::view::view_issue;

#[derive(Clone)]
pub struct McpContext {
    pub config: JiraConfig,
    pub runner: Arc<dyn JiraRunner>,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum ListInput {
    String(String),
    List(Vec<String>),
}

fn parse_list_input(value: Option<&ListInput>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(ListInput::List(values)) => values
            .iter()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect(),
        Some(ListInput::String(value)) => parse_list_string(value),
    }
}

fn ok_text(content: String) -> Result<CallToolResult, CallToolError> {
    Ok(CallToolResult::text_content(vec![TextContent::from(
        content,
    )]))
}

fn ok_json(value: serde_json::Value) -> Result<CallToolResult, CallToolError> {
    let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string());
    ok_text(text)
}

fn ok_serialized<T: Serialize>(payload: &T) -> Result<CallToolResult, CallToolError> {
    let result: OperationResult<&T> = Ok(payload);
    ok_json(envelope(&result))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|value| !value.is_empty())
}

fn default_format() -> String {
    "json".to_string()
}

fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS as u32
}

fn default_close_resolution() -> String {
    DEFAULT_CLOSE_RESOLUTION.to_string()
}

#[mcp_tool(name = "version", description = "Return jira-mcp version information.")]
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct VersionTool {
    /// json|text
    #[serde(default = "default_format")]
    pub format: String,
}

#[mcp_tool(
    name = "create_issue",
    description = "Create a new JIRA issue (Story, Task, Bug, etc.). Returns the issue key and browse URL."
)]
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct CreateIssueTool {
    /// Issue title/summary
    pub summary: String,
    /// Type of issue (Story, Task, Bug, Epic, Sub-task)
    pub issue_type: String,
    /// Project key (e.g. MYTEAM). Falls back to JIRA_DEFAULT_PROJECT.
    pub project: Option<String>,
    pub description: Option<String>,
    /// Comma-separated labels (e.g. "windows,winc") or a list
    pub labels: Option<ListInput>,
}

#[mcp_tool(name = "add_labels", description = "Add labels to an existing JIRA issue.")]
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct AddLabelsTool {
    /// Issue key (e.g. MYTEAM-1234)
    pub issue_key: String,
    /// Comma-separated labels or a list
    pub labels: ListInput,
}

#[mcp_tool(name = "link_issues", description = "Link two JIRA issues together.")]
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct LinkIssuesTool {
    pub inward_issue: String,
    pub outward_issue: String,
    /// Link type (blocks, Related, Duplicate, Depend)
    pub link_type: String,
}

#[mcp_tool(
    name = "transition_issue",
    description = "Transition a JIRA issue to a new state, optionally with a resolution and comment."
)]
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct TransitionIssueTool {
    pub issue_key: String,
    /// Target state (e.g. "In Progress", "Done", "Closed")
    pub state: String,
    /// Resolution (e.g. "Done", "Won't Fix", "Duplicate")
    pub resolution: Option<String>,
    pub comment: Option<String>,
}

#[mcp_tool(
    name = "search_issues",
    description = "Search JIRA issues with JQL. Returns key, summary, status, assignee and URL per issue."
)]
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SearchIssuesTool {
    /// JQL query (e.g. "project = MYTEAM AND status = Open")
    pub jql: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

#[mcp_tool(name = "view_issue", description = "Get detailed information about a JIRA issue.")]
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct ViewIssueTool {
    pub issue_key: String,
}

#[mcp_tool(
    name = "batch_close_issues",
    description = "Close multiple JIRA issues with a shared resolution and optional comment."
)]
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct BatchCloseIssuesTool {
    /// Comma-separated issue keys or a list
    pub issue_keys: ListInput,
    #[serde(default = "default_close_resolution")]
    pub resolution: String,
    pub comment: Option<String>,
}

// Generates enum JiraTools with variants for each tool: the seven Jira operations plus
// `version`, a diagnostic that never touches the jira CLI.
tool_box!(
    JiraTools,
    [
        VersionTool,
        CreateIssueTool,
        AddLabelsTool,
        LinkIssuesTool,
        TransitionIssueTool,
        SearchIssuesTool,
        ViewIssueTool,
        BatchCloseIssuesTool
    ]
);

pub struct JiraServerHandler {
    pub context: McpContext,
}

fn dispatch(tool: JiraTools, context: &McpContext) -> Result<CallToolResult, CallToolError> {
    match tool {
        JiraTools::VersionTool(tool) => tool.call(context),
        JiraTools::CreateIssueTool(tool) => tool.call(context),
        JiraTools::AddLabelsTool(tool) => tool.call(context),
        JiraTools::LinkIssuesTool(tool) => tool.call(context),
        JiraTools::TransitionIssueTool(tool) => tool.call(context),
        JiraTools::SearchIssuesTool(tool) => tool.call(context),
        JiraTools::ViewIssueTool(tool) => tool.call(context),
        JiraTools::BatchCloseIssuesTool(tool) => tool.call(context),
    }
}

#[async_trait]
impl ServerHandler for JiraServerHandler {
    async fn handle_list_tools_request(
        &self,
        _params: Option<PaginatedRequestParams>,
        _runtime: Arc<dyn McpServer>,
    ) -> Result<ListToolsResult, RpcError> {
        Ok(ListToolsResult {
            meta: None,
            next_cursor: None,
            tools: JiraTools::tools(),
        })
    }

    async fn handle_call_tool_request(
        &self,
        params: CallToolRequestParams,
        _runtime: Arc<dyn McpServer>,
    ) -> Result<CallToolResult, CallToolError> {
        debug!(tool = %params.name, "tool call");
        let tool = JiraTools::try_from(params).map_err(CallToolError::new)?;
        // Client calls block on a subprocess; keep them off the async workers.
        let context = self.context.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            dispatch(tool, &context).map_err(|err| err.to_string())
        })
        .await
        .map_err(|err| CallToolError::from_message(err.to_string()))?;
        outcome.map_err(|message| CallToolError::from_message(message))
    }
}

impl VersionTool {
    fn call(&self, _context: &McpContext) -> Result<CallToolResult, CallToolError> {
        if self.format == "text" {
            return ok_text(format!(
                "jira-mcp {}\n{}\n",
                env!("CARGO_PKG_VERSION"),
                version::FULL
            ));
        }
        ok_json(serde_json::json!({
            "name": "jira-mcp",
            "version": env!("CARGO_PKG_VERSION"),
            "full": version::FULL,
        }))
    }
}

impl CreateIssueTool {
    fn call(&self, context: &McpContext) -> Result<CallToolResult, CallToolError> {
        let request = CreateIssueRequest {
            summary: self.summary.clone(),
            issue_type: self.issue_type.clone(),
            project: self.project.clone(),
            description: non_empty(&self.description),
            labels: parse_list_input(self.labels.as_ref()),
        };
        let result = create_issue(context.runner.as_ref(), &context.config, &request);
        ok_json(envelope(&result))
    }
}

impl AddLabelsTool {
    fn call(&self, context: &McpContext) -> Result<CallToolResult, CallToolError> {
        let labels = parse_list_input(Some(&self.labels));
        let applied = add_labels(
            context.runner.as_ref(),
            &context.config,
            &self.issue_key,
            &labels,
        );
        ok_serialized(&applied)
    }
}

impl LinkIssuesTool {
    fn call(&self, context: &McpContext) -> Result<CallToolResult, CallToolError> {
        let outcome = link_issues(
            context.runner.as_ref(),
            &self.inward_issue,
            &self.outward_issue,
            &self.link_type,
        );
        ok_serialized(&outcome)
    }
}

impl TransitionIssueTool {
    fn call(&self, context: &McpContext) -> Result<CallToolResult, CallToolError> {
        let outcome = transition_issue(
            context.runner.as_ref(),
            &context.config,
            &TransitionRequest {
                issue_key: self.issue_key.clone(),
                state: self.state.clone(),
                resolution: self.resolution.clone(),
                comment: self.comment.clone(),
            },
        );
        ok_serialized(&outcome)
    }
}

impl SearchIssuesTool {
    fn call(&self, context: &McpContext) -> Result<CallToolResult, CallToolError> {
        let result = search_issues(
            context.runner.as_ref(),
            &context.config,
            &self.jql,
            self.max_results as usize,
        );
        ok_json(envelope(&result))
    }
}

impl ViewIssueTool {
    fn call(&self, context: &McpContext) -> Result<CallToolResult, CallToolError> {
        let result = view_issue(context.runner.as_ref(), &context.config, &self.issue_key);
        ok_json(envelope(&result))
    }
}

impl BatchCloseIssuesTool {
    fn call(&self, context: &McpContext) -> Result<CallToolResult, CallToolError> {
        let keys = parse_list_input(Some(&self.issue_keys));
        let outcome = batch_close_issues(
            context.runner.as_ref(),
            &context.config,
            &keys,
            &self.resolution,
            self.comment.as_deref().filter(|comment| !comment.is_empty()),
        );
        ok_serialized(&outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jira_mcp_core::runner::{CommandResult, ScriptedRunner};
    use pretty_assertions::assert_eq;

    fn text_payload(result: CallToolResult) -> String {
        result
            .content
            .first()
            .expect("tool content")
            .as_text_content()
            .expect("text content")
            .text
            .clone()
    }

    fn json_payload(result: CallToolResult) -> serde_json::Value {
        serde_json::from_str(&text_payload(result)).expect("json")
    }

    fn context_with(
        responses: impl IntoIterator<Item = CommandResult>,
    ) -> (McpContext, Arc<ScriptedRunner>) {
        let runner = Arc::new(ScriptedRunner::new(responses));
        let context = McpContext {
            config: JiraConfig::new("https://issues.example.com", None),
            runner: runner.clone(),
        };
        (context, runner)
    }

    #[test]
    fn create_issue_without_project_reports_error() {
        let (context, runner) = context_with(Vec::<CommandResult>::new());
        let result = CreateIssueTool {
            summary: "Fix bug".to_string(),
            issue_type: "Bug".to_string(),
            project: None,
            description: None,
            labels: None,
        }
        .call(&context)
        .expect("call");

        assert_eq!(
            json_payload(result),
            serde_json::json!({
                "error": "Project required. Set JIRA_DEFAULT_PROJECT or pass project parameter"
            })
        );
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn create_issue_accepts_label_list() {
        let (context, runner) = context_with([CommandResult::ok("MYTEAM-42")]);
        let result = CreateIssueTool {
            summary: "Add RuntimeClass support".to_string(),
            issue_type: "Story".to_string(),
            project: Some("MYTEAM".to_string()),
            description: Some(String::new()),
            labels: Some(ListInput::List(vec!["windows".to_string(), " ".to_string()])),
        }
        .call(&context)
        .expect("call");

        assert_eq!(
            json_payload(result),
            serde_json::json!({
                "issue_key": "MYTEAM-42",
                "url": "https://issues.example.com/browse/MYTEAM-42",
                "success": true
            })
        );
        // create + one label; the empty description is skipped
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn add_labels_splits_comma_string() {
        let (context, runner) = context_with([
            CommandResult::ok(""),
            CommandResult::exit_failure("", "no permission"),
        ]);
        let result = AddLabelsTool {
            issue_key: "MYTEAM-1234".to_string(),
            labels: ListInput::String("windows, winc".to_string()),
        }
        .call(&context)
        .expect("call");

        assert_eq!(
            json_payload(result),
            serde_json::json!({
                "issue_key": "MYTEAM-1234",
                "results": [
                    {"label": "windows", "success": true, "error": null},
                    {"label": "winc", "success": false, "error": "no permission"}
                ],
                "url": "https://issues.example.com/browse/MYTEAM-1234"
            })
        );
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn link_issues_reports_null_error_on_success() {
        let (context, _runner) = context_with(Vec::<CommandResult>::new());
        let result = LinkIssuesTool {
            inward_issue: "MYTEAM-1234".to_string(),
            outward_issue: "MYTEAM-1235".to_string(),
            link_type: "blocks".to_string(),
        }
        .call(&context)
        .expect("call");

        assert_eq!(
            json_payload(result),
            serde_json::json!({
                "inward_issue": "MYTEAM-1234",
                "outward_issue": "MYTEAM-1235",
                "link_type": "blocks",
                "success": true,
                "error": null
            })
        );
    }

    #[test]
    fn search_issues_defaults_max_results() {
        let tool: SearchIssuesTool =
            serde_json::from_value(serde_json::json!({"jql": "project = X"})).expect("parse");
        assert_eq!(tool.max_results, 50);

        let listing = (1..=60)
            .map(|n| format!("X-{n}\tIssue {n}\tOpen"))
            .collect::<Vec<_>>()
            .join("\n");
        let (context, _runner) = context_with([CommandResult::ok(&listing)]);
        let payload = json_payload(tool.call(&context).expect("call"));
        assert_eq!(payload["count"], 50);
        assert_eq!(payload["issues"][49]["key"], "X-50");
    }

    #[test]
    fn view_issue_wraps_details() {
        let (context, _runner) = context_with([CommandResult::ok("Summary: Flaky test")]);
        let payload = json_payload(
            ViewIssueTool {
                issue_key: "OPS-5".to_string(),
            }
            .call(&context)
            .expect("call"),
        );
        assert_eq!(payload["details"], "Summary: Flaky test");
        assert_eq!(payload["success"], true);
    }

    #[test]
    fn batch_close_defaults_resolution_and_reports_each_key() {
        let tool: BatchCloseIssuesTool = serde_json::from_value(
            serde_json::json!({"issue_keys": "OCPQE-31602,OCPQE-31603"}),
        )
        .expect("parse");
        assert_eq!(tool.resolution, "Duplicate");

        let (context, runner) = context_with([
            CommandResult::ok(""),
            CommandResult::exit_failure("", "already closed"),
        ]);
        let payload = json_payload(tool.call(&context).expect("call"));

        assert_eq!(payload["total"], 2);
        assert_eq!(payload["results"][0]["success"], true);
        assert_eq!(payload["results"][1]["issue_key"], "OCPQE-31603");
        assert_eq!(payload["results"][1]["error"], "already closed");
        assert_eq!(payload["results"][1]["resolution"], "Duplicate");
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn version_reports_package_version() {
        let (context, _runner) = context_with(Vec::<CommandResult>::new());
        let payload = json_payload(
            VersionTool {
                format: "json".to_string(),
            }
            .call(&context)
            .expect("version"),
        );
        assert_eq!(payload["name"], "jira-mcp");
        assert_eq!(payload["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn tool_names_match_tool_surface() {
        let names: Vec<String> = JiraTools::tools()
            .into_iter()
            .map(|tool| tool.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "version",
                "create_issue",
                "add_labels",
                "link_issues",
                "transition_issue",
                "search_issues",
                "view_issue",
                "batch_close_issues"
            ]
        );
    }
}
