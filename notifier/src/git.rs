//! Commit resolution for deployments

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::NotifierError;

/// Resolve the head commit of `branch` on a remote without cloning it
pub async fn resolve_branch_head(repo_url: &str, branch: &str) -> Result<String, NotifierError> {
    let reference = format!("refs/heads/{}", branch);
    debug!("git ls-remote {} {}", repo_url, reference);

    let output = Command::new("git")
        .args(["ls-remote", repo_url, reference.as_str()])
        .output()
        .await
        .map_err(|e| NotifierError::GitError(format!("Failed to run git ls-remote: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(NotifierError::GitError(format!(
            "git ls-remote {} failed: {}",
            repo_url,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let commit = parse_ls_remote(&stdout, branch).ok_or_else(|| {
        NotifierError::GitError(format!("Branch {} not found on {}", branch, repo_url))
    })?;

    info!("Resolved {} to commit {}", reference, commit);
    Ok(commit)
}

/// Find the commit for `refs/heads/<branch>` in `git ls-remote` output
pub fn parse_ls_remote(output: &str, branch: &str) -> Option<String> {
    let reference = format!("refs/heads/{}", branch);
    output.lines().find_map(|line| {
        let (commit, name) = line.split_once('\t')?;
        (name.trim() == reference).then(|| commit.trim().to_string())
    })
}
