use std::path::PathBuf;
use std::time::Duration;

/// Central error type for gitsub.
#[derive(Debug, thiserror::Error)]
pub enum GitsubError {
    #[error("manifest not found: {path}")]
    ManifestMissing { path: PathBuf },

    #[error("parent sync failed: {message}")]
    ParentSyncFailed { message: String },

    #[error("checkout of {branch} failed: {message}")]
    CheckoutFailed { branch: String, message: String },

    #[error("pull failed: {message}")]
    PullFailed { message: String },

    #[error("submodule path not found: {path}")]
    SubmoduleMissing { path: PathBuf },

    #[error("timed out after {limit:?}")]
    Timeout { limit: Duration },

    #[error("task aborted: {message}")]
    TaskAborted { message: String },

    #[error("git error: {message}")]
    GitError { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}
