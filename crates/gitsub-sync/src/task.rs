use std::path::{Path, PathBuf};

use chrono::Utc;
use gitsub_core::error::GitsubError;
use gitsub_core::models::outcome::{FailureKind, SubmodulePath, SyncOutcome};

use crate::git_ops::{GitClient, GitOutput};
use crate::normalize::DiagnosticFilter;

/// Checkout-then-pull of one submodule.
#[derive(Debug, Clone)]
pub struct SubmoduleSyncTask {
    pub path: SubmodulePath,
    pub dir: PathBuf,
    pub branch: String,
}

impl SubmoduleSyncTask {
    /// `path` is resolved against the superproject `root`.
    pub fn new(root: &Path, path: SubmodulePath, branch: impl Into<String>) -> Self {
        let dir = root.join(path.as_str());
        Self {
            path,
            dir,
            branch: branch.into(),
        }
    }

    /// Run the sync. Every error ends up in the returned outcome.
    ///
    /// Flow:
    /// 1. Check the working copy exists
    /// 2. Checkout the target branch (stop here on failure)
    /// 3. Pull from upstream
    pub async fn run(self, git: &dyn GitClient, filter: &DiagnosticFilter) -> SyncOutcome {
        let started_at = Utc::now();
        tracing::info!("pulling {}:{}", self.path, self.branch);

        match self.run_inner(git, filter).await {
            Ok(message) => SyncOutcome::success(self.path, message, started_at),
            Err(e) => {
                let kind = failure_kind(&e);
                tracing::warn!("{} failed at {kind}: {e}", self.path);
                SyncOutcome::failure(self.path, kind, failure_message(e), started_at)
            }
        }
    }

    async fn run_inner(
        &self,
        git: &dyn GitClient,
        filter: &DiagnosticFilter,
    ) -> Result<String, GitsubError> {
        if !self.dir.is_dir() {
            return Err(GitsubError::SubmoduleMissing {
                path: self.dir.clone(),
            });
        }

        let checkout = git.checkout(&self.dir, &self.branch).await?;
        if !checkout.success {
            return Err(GitsubError::CheckoutFailed {
                branch: self.branch.clone(),
                message: filter.failure_message(&checkout.stderr, &checkout.stdout),
            });
        }

        let pull = git.pull(&self.dir).await?;
        if !pull.success {
            return Err(GitsubError::PullFailed {
                message: filter.failure_message(&pull.stderr, &pull.stdout),
            });
        }

        Ok(success_message(filter, &checkout, &pull))
    }
}

/// Cleaned diagnostics of both commands, else the last line pull printed.
fn success_message(filter: &DiagnosticFilter, checkout: &GitOutput, pull: &GitOutput) -> String {
    let diagnostic = filter.normalize(&format!("{}\n{}", checkout.stderr, pull.stderr));
    if !diagnostic.is_empty() {
        return diagnostic;
    }
    pull.stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .unwrap_or_default()
        .to_string()
}

fn failure_kind(e: &GitsubError) -> FailureKind {
    match e {
        GitsubError::CheckoutFailed { .. } => FailureKind::Checkout,
        GitsubError::PullFailed { .. } => FailureKind::Pull,
        GitsubError::SubmoduleMissing { .. } => FailureKind::Missing,
        _ => FailureKind::Unexpected,
    }
}

/// Git's own words for command failures, the error text otherwise.
fn failure_message(e: GitsubError) -> String {
    match e {
        GitsubError::CheckoutFailed { message, .. } | GitsubError::PullFailed { message } => {
            message
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gitsub_core::models::outcome::SyncStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        checkout: GitOutput,
        pull: GitOutput,
        pulls: AtomicUsize,
    }

    impl Scripted {
        fn new(checkout: GitOutput, pull: GitOutput) -> Self {
            Self {
                checkout,
                pull,
                pulls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GitClient for Scripted {
        async fn update_parent(&self, _root: &Path) -> Result<GitOutput, GitsubError> {
            Ok(GitOutput::ok("", ""))
        }

        async fn checkout(&self, _dir: &Path, _branch: &str) -> Result<GitOutput, GitsubError> {
            Ok(self.checkout.clone())
        }

        async fn pull(&self, _dir: &Path) -> Result<GitOutput, GitsubError> {
            self.pulls.fetch_add(1, Ordering::SeqCst);
            Ok(self.pull.clone())
        }
    }

    fn workdir(sub: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(sub)).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_success_ignores_diagnostic_chatter() {
        let root = workdir("libs/foo");
        let git = Scripted::new(
            GitOutput::ok("", "Already on 'main'\nYour branch is up to date with 'origin/main'.\n"),
            GitOutput::ok("Already up to date.\n", ""),
        );
        let task = SubmoduleSyncTask::new(root.path(), "libs/foo".into(), "main");
        let outcome = task.run(&git, &DiagnosticFilter::default()).await;

        assert_eq!(outcome.status, SyncStatus::Success);
        assert_eq!(outcome.message, "Already up to date.");
    }

    #[tokio::test]
    async fn test_checkout_failure_skips_pull() {
        let root = workdir("libs/bar");
        let git = Scripted::new(
            GitOutput::failed("fatal: invalid reference: main\n"),
            GitOutput::ok("", ""),
        );
        let task = SubmoduleSyncTask::new(root.path(), "libs/bar".into(), "main");
        let outcome = task.run(&git, &DiagnosticFilter::default()).await;

        assert_eq!(outcome.status, SyncStatus::Failure);
        assert_eq!(outcome.failure, Some(FailureKind::Checkout));
        assert_eq!(outcome.message, "fatal: invalid reference: main");
        assert_eq!(git.pulls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_pull_failure() {
        let root = workdir("app");
        let git = Scripted::new(
            GitOutput::ok("", "Switched to branch 'main'\n"),
            GitOutput::failed("fatal: could not read Username for 'https://example.com': terminal prompts disabled\n"),
        );
        let task = SubmoduleSyncTask::new(root.path(), "app".into(), "main");
        let outcome = task.run(&git, &DiagnosticFilter::default()).await;

        assert_eq!(outcome.failure, Some(FailureKind::Pull));
        assert!(outcome.message.starts_with("fatal: could not read Username"));
        assert_eq!(git.pulls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let git = Scripted::new(GitOutput::ok("", ""), GitOutput::ok("", ""));
        let task = SubmoduleSyncTask::new(root.path(), "gone".into(), "main");
        let outcome = task.run(&git, &DiagnosticFilter::default()).await;

        assert_eq!(outcome.failure, Some(FailureKind::Missing));
        assert!(outcome.message.contains("submodule path not found"));
    }

    #[tokio::test]
    async fn test_exit_status_wins_over_empty_stderr() {
        let root = workdir("libs/quiet");
        let git = Scripted::new(GitOutput::ok("", ""), GitOutput::failed(""));
        let task = SubmoduleSyncTask::new(root.path(), "libs/quiet".into(), "main");
        let outcome = task.run(&git, &DiagnosticFilter::default()).await;

        assert_eq!(outcome.status, SyncStatus::Failure);
        assert_eq!(outcome.failure, Some(FailureKind::Pull));
    }

    #[test]
    fn test_failure_kind_mapping() {
        let checkout = GitsubError::CheckoutFailed {
            branch: "main".into(),
            message: String::new(),
        };
        assert_eq!(failure_kind(&checkout), FailureKind::Checkout);
        let spawn = GitsubError::GitError {
            message: "failed to run git: No such file or directory".into(),
        };
        assert_eq!(failure_kind(&spawn), FailureKind::Unexpected);
        assert_eq!(failure_message(spawn), "git error: failed to run git: No such file or directory");
    }
}
