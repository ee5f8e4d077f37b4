mod tools;
mod version;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use rust_mcp_sdk::schema::{
    Implementation, InitializeResult, ProtocolVersion, ServerCapabilities, ServerCapabilitiesTools,
};
use rust_mcp_sdk::{
    mcp_server::{server_runtime, McpServerOptions},
    McpServer, StdioTransport, ToMcpServerHandler, TransportOptions,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use jira_mcp_core::config::{
    JiraConfig, DEFAULT_CLIENT_COMMAND, DEFAULT_JIRA_URL, DEFAULT_TIMEOUT_SECS,
};
use jira_mcp_core::runner::CliRunner;

use crate::tools::{JiraServerHandler, McpContext};

#[derive(Parser)]
#[command(name = "jira-mcp", version = version::FULL)]
struct Args {
    /// Jira base URL used to build browse links.
    #[arg(long, env = "JIRA_URL", default_value = DEFAULT_JIRA_URL)]
    jira_url: String,
    /// Project key used by create_issue when none is passed.
    #[arg(long, env = "JIRA_DEFAULT_PROJECT")]
    default_project: Option<String>,
    /// Jira CLI command line; extra words are prepended to every call.
    #[arg(long, env = "JIRA_CLI_CMD", default_value = DEFAULT_CLIENT_COMMAND)]
    jira_cmd: String,
    /// Seconds to wait for each Jira CLI call.
    #[arg(long, env = "JIRA_CLI_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // stdout carries the MCP protocol.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<JiraConfig> {
    let config = JiraConfig::new(&args.jira_url, args.default_project.as_deref())
        .with_command(&args.jira_cmd)?
        .with_timeout_secs(args.timeout_secs)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(&args)?;
    if !config.command.is_available() {
        warn!(
            program = %config.command.program,
            "jira CLI not found; tool calls will fail until it is installed"
        );
    }
    info!(base_url = %config.base_url, default_project = ?config.default_project, "starting jira-mcp");

    let server_details = InitializeResult {
        server_info: Implementation {
            name: "jira-mcp".into(),
            version: version::FULL.into(),
            title: Some("Jira MCP Server".into()),
            description: Some("MCP server exposing Jira operations through the jira CLI".into()),
            icons: vec![],
            website_url: None,
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools { list_changed: None }),
            ..Default::default()
        },
        meta: None,
        instructions: Some(
            "Jira operations: create, label, link, transition, search, view and batch-close issues"
                .into(),
        ),
        protocol_version: ProtocolVersion::V2025_11_25.into(),
    };

    let transport = StdioTransport::new(TransportOptions::default())
        .map_err(|err| anyhow!("failed to open stdio transport: {}", err))?;
    let handler = JiraServerHandler {
        context: McpContext {
            runner: Arc::new(CliRunner::from_config(&config)),
            config,
        },
    };

    let server = server_runtime::create_server(McpServerOptions {
        server_details,
        transport,
        handler: handler.to_mcp_server_handler(),
        task_store: None,
        client_task_store: None,
    });

    server
        .start()
        .await
        .map_err(|err| anyhow!("MCP server stopped: {}", err))
}
