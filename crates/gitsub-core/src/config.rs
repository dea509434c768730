use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::GitsubError;

/// Top-level gitsub configuration, stored at `~/.gitsub/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitsubConfig {
    /// Branch checked out in every submodule when none is given on the command line.
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Maximum number of submodules synced at the same time.
    #[serde(default = "default_concurrency")]
    pub sync_concurrency: usize,

    /// Per-submodule timeout in seconds. `0` disables the timeout.
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,

    /// Exit non-zero when any submodule fails to sync.
    #[serde(default)]
    pub fail_on_error: bool,

    /// Record each run in the history database.
    #[serde(default = "default_record_history")]
    pub record_history: bool,

    /// Manifest file name, relative to the superproject root.
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,

    /// Extra phrases stripped from git diagnostics before they are reported.
    #[serde(default)]
    pub ignored_diagnostics: Vec<String>,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_concurrency() -> usize {
    32
}

fn default_task_timeout_secs() -> u64 {
    300
}

fn default_record_history() -> bool {
    true
}

fn default_manifest_file() -> String {
    ".gitmodules".to_string()
}

impl Default for GitsubConfig {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
            sync_concurrency: default_concurrency(),
            task_timeout_secs: default_task_timeout_secs(),
            fail_on_error: false,
            record_history: true,
            manifest_file: default_manifest_file(),
            ignored_diagnostics: Vec::new(),
        }
    }
}

impl GitsubConfig {
    /// Returns the gitsub home directory (`~/.gitsub/`).
    pub fn home_dir() -> Result<PathBuf, GitsubError> {
        let base = dirs::home_dir().ok_or_else(|| GitsubError::Config {
            message: "could not determine home directory".into(),
        })?;
        Ok(base.join(".gitsub"))
    }

    /// Returns the path to the config file.
    pub fn config_path() -> Result<PathBuf, GitsubError> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    /// Returns the path to the history database.
    pub fn db_path() -> Result<PathBuf, GitsubError> {
        Ok(Self::home_dir()?.join("gitsub.db"))
    }

    /// Load config from the default location, or return defaults if not found.
    pub fn load() -> Result<Self, GitsubError> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, GitsubError> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!("loading config from {}", path.display());
        toml::from_str(&content).map_err(|e| GitsubError::Serialization(e.to_string()))
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), GitsubError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| GitsubError::Serialization(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Initialize the gitsub home directory with default config.
    pub fn init() -> Result<PathBuf, GitsubError> {
        let home = Self::home_dir()?;
        std::fs::create_dir_all(&home)?;

        let config_path = Self::config_path()?;
        if !config_path.exists() {
            Self::default().save_to(&config_path)?;
        }

        Ok(home)
    }

    /// Semaphore size; never zero.
    pub fn effective_concurrency(&self) -> usize {
        self.sync_concurrency.max(1)
    }

    /// Per-submodule timeout, if enabled.
    pub fn task_timeout(&self) -> Option<Duration> {
        match self.task_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
