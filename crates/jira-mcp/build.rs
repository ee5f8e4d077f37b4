use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn main() {
    // Re-stamp the version when the checked-out commit or the index changes.
    for name in ["HEAD", "index"] {
        if let Some(path) = git(&["rev-parse", "--path-format=absolute", "--git-path", name]) {
            println!("cargo:rerun-if-changed={}", path);
        }
    }

    let sha = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "nogit".to_string());
    let count = git(&["rev-list", "--count", "HEAD"]).unwrap_or_else(|| "0".to_string());
    let dirty = match git(&["status", "--porcelain"]) {
        Some(status) if status.is_empty() => "",
        _ => ".dirty",
    };

    println!("cargo:rustc-env=JIRA_MCP_GIT_SHA={}", sha);
    println!("cargo:rustc-env=JIRA_MCP_GIT_COUNT={}", count);
    println!("cargo:rustc-env=JIRA_MCP_GIT_DIRTY={}", dirty);
}
