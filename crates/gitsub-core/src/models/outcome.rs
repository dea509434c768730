use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Relative path of one submodule's working copy, as written in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmodulePath(String);

impl SubmodulePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubmodulePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SubmodulePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SubmodulePath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Terminal status of one submodule sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Success,
    Failure,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Success => write!(f, "success"),
            SyncStatus::Failure => write!(f, "failure"),
        }
    }
}

impl std::str::FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(SyncStatus::Success),
            "failure" => Ok(SyncStatus::Failure),
            _ => Err(format!("unknown sync status: {s}")),
        }
    }
}

/// Which step a failed sync stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The working copy refused the checkout; pull was not attempted.
    Checkout,
    Pull,
    /// The submodule directory does not exist on disk.
    Missing,
    Timeout,
    /// Anything else: spawn errors, panics, aborted tasks.
    Unexpected,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Checkout => write!(f, "checkout"),
            FailureKind::Pull => write!(f, "pull"),
            FailureKind::Missing => write!(f, "missing"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Unexpected => write!(f, "unexpected"),
        }
    }
}

impl std::str::FromStr for FailureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checkout" => Ok(FailureKind::Checkout),
            "pull" => Ok(FailureKind::Pull),
            "missing" => Ok(FailureKind::Missing),
            "timeout" => Ok(FailureKind::Timeout),
            "unexpected" => Ok(FailureKind::Unexpected),
            _ => Err(format!("unknown failure kind: {s}")),
        }
    }
}

/// Result of syncing a single submodule. Built once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub submodule: SubmodulePath,
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    pub message: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncOutcome {
    pub fn success(
        submodule: SubmodulePath,
        message: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            submodule,
            status: SyncStatus::Success,
            failure: None,
            message: message.into(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn failure(
        submodule: SubmodulePath,
        kind: FailureKind,
        message: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            submodule,
            status: SyncStatus::Failure,
            failure: Some(kind),
            message: message.into(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SyncStatus::Success
    }
}
