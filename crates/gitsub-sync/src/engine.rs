use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::Instrument;

use gitsub_core::config::GitsubConfig;
use gitsub_core::error::GitsubError;
use gitsub_core::manifest;
use gitsub_core::models::outcome::{FailureKind, SubmodulePath, SyncOutcome};
use gitsub_core::models::run::SyncRun;

use crate::git_ops::GitClient;
use crate::normalize::DiagnosticFilter;
use crate::task::SubmoduleSyncTask;

/// What happened in the submodule phase of a run.
#[derive(Debug)]
pub enum SubmodulePhase {
    /// One outcome per manifest path, in manifest order.
    Synced(Vec<SyncOutcome>),
    /// No manifest; no submodule was touched.
    ManifestMissing(PathBuf),
}

/// Syncs a superproject and all of its submodules.
pub struct SyncOrchestrator {
    git: Arc<dyn GitClient>,
    filter: Arc<DiagnosticFilter>,
    concurrency: usize,
    timeout: Option<Duration>,
    manifest_file: String,
    progress: bool,
}

impl SyncOrchestrator {
    pub fn new(git: Arc<dyn GitClient>, config: &GitsubConfig) -> Self {
        Self {
            git,
            filter: Arc::new(DiagnosticFilter::new(&config.ignored_diagnostics)),
            concurrency: config.effective_concurrency().min(Semaphore::MAX_PERMITS),
            timeout: config.task_timeout(),
            manifest_file: config.manifest_file.clone(),
            progress: false,
        }
    }

    /// Show a spinner per submodule while syncing.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Full run: parent update, then every submodule.
    ///
    /// Only a failed parent update is an error. A missing manifest is
    /// recorded on the run, submodule failures on their outcomes.
    pub async fn run(&self, root: &Path, branch: &str) -> Result<SyncRun, GitsubError> {
        let run = SyncRun::new(root.to_path_buf(), branch.to_string());
        let span = tracing::info_span!("sync", run = %run.id);
        self.run_inner(run, root, branch).instrument(span).await
    }

    async fn run_inner(
        &self,
        mut run: SyncRun,
        root: &Path,
        branch: &str,
    ) -> Result<SyncRun, GitsubError> {
        self.update_parent(root).await?;

        match self.sync_submodules(root, branch).await? {
            SubmodulePhase::Synced(outcomes) => run.outcomes = outcomes,
            SubmodulePhase::ManifestMissing(path) => {
                tracing::warn!("{} not found, skipping submodules", path.display());
                run.manifest_missing = true;
            }
        }

        run.finished_at = Utc::now();
        Ok(run)
    }

    /// `git pull` + `git submodule update --init --recursive` on the superproject.
    pub async fn update_parent(&self, root: &Path) -> Result<(), GitsubError> {
        tracing::info!("updating superproject at {}", root.display());
        let out = self.git.update_parent(root).await?;
        if !out.success {
            let message = self.filter.failure_message(&out.stderr, &out.stdout);
            tracing::error!("superproject update failed: {message}");
            return Err(GitsubError::ParentSyncFailed { message });
        }
        if !out.stderr.trim().is_empty() {
            tracing::info!("{}", out.stderr.trim());
        }
        Ok(())
    }

    /// Read the manifest under `root` and sync every path it lists.
    pub async fn sync_submodules(
        &self,
        root: &Path,
        branch: &str,
    ) -> Result<SubmodulePhase, GitsubError> {
        let manifest_path = root.join(&self.manifest_file);
        let text = match manifest::read_manifest(&manifest_path) {
            Ok(text) => text,
            Err(GitsubError::ManifestMissing { path }) => {
                return Ok(SubmodulePhase::ManifestMissing(path))
            }
            Err(e) => return Err(e),
        };

        let paths = manifest::parse(&text);
        tracing::info!("indexed {} submodules", paths.len());
        Ok(SubmodulePhase::Synced(self.sync_all(root, paths, branch).await))
    }

    /// Sync all paths concurrently, bounded by the semaphore, and wait for
    /// every one of them. Returns exactly one outcome per path, in input order.
    pub async fn sync_all(
        &self,
        root: &Path,
        paths: Vec<SubmodulePath>,
        branch: &str,
    ) -> Vec<SyncOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let multi = if self.progress {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };
        let style = ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

        let handles: Vec<_> = paths
            .into_iter()
            .map(|path| {
                let sem = semaphore.clone();
                let git = self.git.clone();
                let filter = self.filter.clone();
                let limit = self.timeout;
                let task = SubmoduleSyncTask::new(root, path.clone(), branch);
                let pb = multi.add(ProgressBar::new_spinner());
                pb.set_style(style.clone());
                pb.set_message(format!("pulling {path}"));

                let handle = tokio::spawn(async move {
                    let _permit = sem.acquire_owned().await;
                    let started_at = Utc::now();
                    let path = task.path.clone();
                    let work = task.run(git.as_ref(), filter.as_ref());
                    let outcome = match limit {
                        Some(limit) => match tokio::time::timeout(limit, work).await {
                            Ok(outcome) => outcome,
                            Err(_) => {
                                tracing::warn!("{path} timed out after {limit:?}");
                                SyncOutcome::failure(
                                    path,
                                    FailureKind::Timeout,
                                    GitsubError::Timeout { limit }.to_string(),
                                    started_at,
                                )
                            }
                        },
                        None => work.await,
                    };
                    pb.finish_with_message(format!("{}: {}", outcome.submodule, outcome.status));
                    outcome
                }
                .in_current_span());
                (path, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (path, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!("sync task for {path} aborted: {e}");
                    outcomes.push(SyncOutcome::failure(
                        path,
                        FailureKind::Unexpected,
                        GitsubError::TaskAborted {
                            message: e.to_string(),
                        }
                        .to_string(),
                        Utc::now(),
                    ));
                }
            }
        }

        outcomes
    }
}
