//! Core operations for the Jira MCP server.
//!
//! Every operation builds an argument vector for the external `jira` client, runs it
//! through a [`runner::JiraRunner`], and shapes the result into a JSON-serializable
//! envelope.

pub mod config;
pub mod create;
pub mod envelope;
pub mod issue_key;
pub mod labels;
pub mod link;
pub mod list;
pub mod runner;
pub mod search;
pub mod transition;
pub mod view;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
