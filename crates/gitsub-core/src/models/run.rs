use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use super::outcome::{SyncOutcome, SyncStatus};

/// Unique identifier for a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One invocation of `gitsub sync` over a superproject.
///
/// `outcomes` holds one entry per manifest path in completion-independent
/// launch order; sorting happens when a report is derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRun {
    pub id: RunId,
    pub root: PathBuf,
    pub branch: String,
    pub manifest_missing: bool,
    pub outcomes: Vec<SyncOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncRun {
    pub fn new(root: PathBuf, branch: String) -> Self {
        let now = Utc::now();
        Self {
            id: RunId::new(),
            root,
            branch,
            manifest_missing: false,
            outcomes: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == SyncStatus::Failure)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Wall-clock duration of the run.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
