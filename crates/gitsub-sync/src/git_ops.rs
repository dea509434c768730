use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use gitsub_core::error::GitsubError;

/// Result of a git command execution.
#[derive(Debug, Clone, Default)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl GitOutput {
    pub fn ok(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            success: true,
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
        }
    }
}

/// The git operations a sync needs.
///
/// Implementations return `Err` only when git could not be run at all; a
/// command that ran and failed is an `Ok` with `success == false`.
#[async_trait]
pub trait GitClient: Send + Sync {
    /// Pull the superproject and init/update submodule references recursively.
    async fn update_parent(&self, root: &Path) -> Result<GitOutput, GitsubError>;

    /// Check out `branch` in a submodule working copy.
    async fn checkout(&self, dir: &Path, branch: &str) -> Result<GitOutput, GitsubError>;

    /// Pull the current branch of a submodule from its upstream.
    async fn pull(&self, dir: &Path) -> Result<GitOutput, GitsubError>;
}

/// `GitClient` backed by the `git` executable.
pub struct SystemGit {
    executable: String,
}

impl SystemGit {
    pub fn new() -> Self {
        Self {
            executable: "git".to_string(),
        }
    }

    pub fn with_executable(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Run a git command in the given directory.
    async fn git(&self, dir: &Path, args: &[&str]) -> Result<GitOutput, GitsubError> {
        tracing::debug!("{} {} (in {})", self.executable, args.join(" "), dir.display());
        let output = Command::new(&self.executable)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| GitsubError::GitError {
                message: format!("failed to run git {}: {e}", args.join(" ")),
            })?;

        Ok(GitOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
        })
    }
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitClient for SystemGit {
    async fn update_parent(&self, root: &Path) -> Result<GitOutput, GitsubError> {
        let pull = self.git(root, &["pull"]).await?;
        if !pull.success {
            return Ok(pull);
        }

        let update = self
            .git(root, &["submodule", "update", "--init", "--recursive"])
            .await?;
        Ok(GitOutput {
            stdout: format!("{}{}", pull.stdout, update.stdout),
            stderr: format!("{}{}", pull.stderr, update.stderr),
            success: update.success,
        })
    }

    async fn checkout(&self, dir: &Path, branch: &str) -> Result<GitOutput, GitsubError> {
        self.git(dir, &["checkout", branch]).await
    }

    async fn pull(&self, dir: &Path) -> Result<GitOutput, GitsubError> {
        self.git(dir, &["pull"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_executable_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let git = SystemGit::with_executable("gitsub-definitely-not-a-real-git");
        let err = git.pull(dir.path()).await.unwrap_err();
        assert!(matches!(err, GitsubError::GitError { .. }));
        assert!(err.to_string().contains("failed to run git pull"));
    }
}
