pub const FULL: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "+git.",
    env!("JIRA_MCP_GIT_COUNT"),
    ".",
    env!("JIRA_MCP_GIT_SHA"),
    env!("JIRA_MCP_GIT_DIRTY")
);
