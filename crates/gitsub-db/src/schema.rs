//! SQL statements for the run history schema.

pub const CREATE_SCHEMA_VERSION: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL
)";

pub const CREATE_SYNC_RUNS: &str = "
CREATE TABLE IF NOT EXISTS sync_runs (
    id                  TEXT PRIMARY KEY,
    root                TEXT NOT NULL,
    branch              TEXT NOT NULL,
    manifest_missing    INTEGER NOT NULL DEFAULT 0,
    total               INTEGER NOT NULL DEFAULT 0,
    failed              INTEGER NOT NULL DEFAULT 0,
    started_at          TEXT NOT NULL,
    finished_at         TEXT NOT NULL
)";

pub const CREATE_SUBMODULE_OUTCOMES: &str = "
CREATE TABLE IF NOT EXISTS submodule_outcomes (
    run_id          TEXT NOT NULL,
    seq             INTEGER NOT NULL,
    path            TEXT NOT NULL,
    status          TEXT NOT NULL,
    failure_kind    TEXT,
    message         TEXT NOT NULL DEFAULT '',
    started_at      TEXT NOT NULL,
    finished_at     TEXT NOT NULL,
    PRIMARY KEY (run_id, seq),
    FOREIGN KEY (run_id) REFERENCES sync_runs(id) ON DELETE CASCADE
)";

pub const CREATE_RUNS_STARTED_INDEX: &str = "
CREATE INDEX IF NOT EXISTS idx_sync_runs_started ON sync_runs (started_at)";
