use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::PathBuf;
use uuid::Uuid;

use gitsub_core::models::outcome::{FailureKind, SubmodulePath, SyncOutcome, SyncStatus};
use gitsub_core::models::run::{RunId, SyncRun};

// ── Helpers ──

fn parse_dt(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn fmt_dt(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// A stored run without its outcomes.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub id: RunId,
    pub root: PathBuf,
    pub branch: String,
    pub manifest_missing: bool,
    pub total: u32,
    pub failed: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

// ── Runs ──

/// Insert a run and all of its outcomes atomically.
pub fn insert_run(conn: &Connection, run: &SyncRun) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO sync_runs (id, root, branch, manifest_missing, total, failed, started_at, finished_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            run.id.0.to_string(),
            run.root.to_string_lossy().to_string(),
            run.branch,
            run.manifest_missing as i32,
            run.total() as i64,
            run.failed() as i64,
            fmt_dt(&run.started_at),
            fmt_dt(&run.finished_at),
        ],
    )?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO submodule_outcomes (run_id, seq, path, status, failure_kind, message, started_at, finished_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for (seq, outcome) in run.outcomes.iter().enumerate() {
            stmt.execute(params![
                run.id.0.to_string(),
                seq as i64,
                outcome.submodule.as_str(),
                outcome.status.to_string(),
                outcome.failure.map(|k| k.to_string()),
                outcome.message,
                fmt_dt(&outcome.started_at),
                fmt_dt(&outcome.finished_at),
            ])?;
        }
    }

    tx.commit()?;
    tracing::debug!("recorded run {} ({} outcomes)", run.id, run.outcomes.len());
    Ok(())
}

/// Most recent runs first.
pub fn list_runs(conn: &Connection, limit: u32) -> anyhow::Result<Vec<RunSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, root, branch, manifest_missing, total, failed, started_at, finished_at
         FROM sync_runs ORDER BY started_at DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| row_to_run(row))?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

pub fn delete_run(conn: &Connection, id: &RunId) -> anyhow::Result<()> {
    conn.execute(
        "DELETE FROM sync_runs WHERE id = ?1",
        params![id.0.to_string()],
    )?;
    Ok(())
}

fn row_to_run(row: &rusqlite::Row) -> rusqlite::Result<RunSummary> {
    let id_str: String = row.get(0)?;
    let root: String = row.get(1)?;
    let branch: String = row.get(2)?;
    let manifest_missing: i32 = row.get(3)?;
    let total: i64 = row.get(4)?;
    let failed: i64 = row.get(5)?;
    let started_str: String = row.get(6)?;
    let finished_str: String = row.get(7)?;

    Ok(RunSummary {
        id: RunId::from_uuid(Uuid::parse_str(&id_str).unwrap_or_default()),
        root: PathBuf::from(root),
        branch,
        manifest_missing: manifest_missing != 0,
        total: total as u32,
        failed: failed as u32,
        started_at: parse_dt(&started_str),
        finished_at: parse_dt(&finished_str),
    })
}

// ── Outcomes ──

/// Outcomes of a run, in the order they were recorded.
pub fn get_run_outcomes(conn: &Connection, run_id: &RunId) -> anyhow::Result<Vec<SyncOutcome>> {
    let mut stmt = conn.prepare(
        "SELECT path, status, failure_kind, message, started_at, finished_at
         FROM submodule_outcomes WHERE run_id = ?1 ORDER BY seq",
    )?;
    let rows = stmt.query_map(params![run_id.0.to_string()], |row| {
        let path: String = row.get(0)?;
        let status_str: String = row.get(1)?;
        let kind_str: Option<String> = row.get(2)?;
        let message: String = row.get(3)?;
        let started_str: String = row.get(4)?;
        let finished_str: String = row.get(5)?;
        Ok(SyncOutcome {
            submodule: SubmodulePath::new(path),
            status: status_str.parse().unwrap_or(SyncStatus::Failure),
            failure: kind_str.and_then(|s| s.parse::<FailureKind>().ok()),
            message,
            started_at: parse_dt(&started_str),
            finished_at: parse_dt(&finished_str),
        })
    })?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::open_memory_db;

    fn sample_run() -> SyncRun {
        let mut run = SyncRun::new(PathBuf::from("/work/super"), "main".to_string());
        let now = Utc::now();
        run.outcomes.push(SyncOutcome::success(
            "libs/foo".into(),
            "Already up to date.",
            now,
        ));
        run.outcomes.push(SyncOutcome::failure(
            "libs/bar".into(),
            FailureKind::Checkout,
            "error: pathspec 'main' did not match any file(s) known to git",
            now,
        ));
        run.finished_at = Utc::now();
        run
    }

    #[test]
    fn test_run_crud() {
        let conn = open_memory_db().unwrap();
        let run = sample_run();
        insert_run(&conn, &run).unwrap();

        let runs = list_runs(&conn, 10).unwrap();
        assert_eq!(runs.len(), 1);
        let found = &runs[0];
        assert_eq!(found.id, run.id);
        assert_eq!(found.branch, "main");
        assert_eq!(found.total, 2);
        assert_eq!(found.failed, 1);
        assert!(!found.manifest_missing);

        let outcomes = get_run_outcomes(&conn, &run.id).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].submodule.as_str(), "libs/foo");
        assert_eq!(outcomes[1].status, SyncStatus::Failure);
        assert_eq!(outcomes[1].failure, Some(FailureKind::Checkout));

        delete_run(&conn, &run.id).unwrap();
        assert!(list_runs(&conn, 10).unwrap().is_empty());
        assert!(get_run_outcomes(&conn, &run.id).unwrap().is_empty());
    }

    #[test]
    fn test_list_runs_newest_first() {
        let conn = open_memory_db().unwrap();
        let mut older = sample_run();
        older.started_at = Utc::now() - chrono::Duration::hours(1);
        let newer = sample_run();
        insert_run(&conn, &older).unwrap();
        insert_run(&conn, &newer).unwrap();

        let runs = list_runs(&conn, 10).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].id, newer.id);

        let limited = list_runs(&conn, 1).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_manifest_missing_run() {
        let conn = open_memory_db().unwrap();
        let mut run = SyncRun::new(PathBuf::from("/work/empty"), "main".to_string());
        run.manifest_missing = true;
        insert_run(&conn, &run).unwrap();

        let runs = list_runs(&conn, 10).unwrap();
        assert!(runs[0].manifest_missing);
        assert_eq!(runs[0].total, 0);
    }
}
