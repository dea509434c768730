use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::{style, Term};
use gitsub_core::config::GitsubConfig;
use gitsub_core::models::run::SyncRun;
use gitsub_sync::engine::SyncOrchestrator;
use gitsub_sync::git_ops::SystemGit;
use gitsub_sync::report::SyncReport;

/// Exit code used when submodules failed and `--strict` is on.
const EXIT_SUBMODULE_FAILURES: i32 = 2;

#[derive(Args)]
pub struct SyncArgs {
    /// Branch to check out in every submodule (defaults to `default_branch` from config)
    #[arg(short, long)]
    branch: Option<String>,
    /// Superproject root (defaults to the current directory)
    #[arg(long)]
    root: Option<PathBuf>,
    /// Maximum submodules synced at once
    #[arg(long)]
    concurrency: Option<usize>,
    /// Per-submodule timeout in seconds (0 disables)
    #[arg(long)]
    timeout: Option<u64>,
    /// Exit non-zero if any submodule fails
    #[arg(long)]
    strict: bool,
    /// Print the run as JSON instead of text
    #[arg(long)]
    json: bool,
    /// Don't record this run in the history database
    #[arg(long)]
    no_history: bool,
}

pub async fn run(args: SyncArgs) -> anyhow::Result<i32> {
    let mut config = GitsubConfig::load()?;
    if let Some(n) = args.concurrency {
        config.sync_concurrency = n;
    }
    if let Some(secs) = args.timeout {
        config.task_timeout_secs = secs;
    }
    if args.strict {
        config.fail_on_error = true;
    }
    if args.no_history {
        config.record_history = false;
    }

    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let branch = args
        .branch
        .unwrap_or_else(|| config.default_branch.clone());

    let color = !args.json && console::colors_enabled();
    let progress = !args.json && Term::stderr().is_term();

    if !args.json {
        println!("Performing 'git pull' and 'git submodule update'");
    }

    let orchestrator =
        SyncOrchestrator::new(Arc::new(SystemGit::new()), &config).with_progress(progress);
    let run = orchestrator.run(&root, &branch).await?;
    let report = SyncReport::from_outcomes(run.outcomes.clone());

    if args.json {
        let mut sorted = run.clone();
        sorted.outcomes = report.outcomes().to_vec();
        println!("{}", serde_json::to_string_pretty(&sorted)?);
    } else if run.manifest_missing {
        eprintln!(
            "{}",
            style(format!("{} file not found", config.manifest_file))
                .red()
                .force_styling(color)
        );
    } else {
        println!("Indexed {} submodules on branch {branch}", report.len());
        report.print(color);
    }

    if config.record_history {
        record(&run);
    }

    if !args.json {
        let secs = run.elapsed().num_milliseconds() as f64 / 1000.0;
        println!(
            "{}",
            style(format!("gitsub sync: {secs:.2}s")).green().force_styling(color)
        );
    }

    Ok(exit_code(&config, &run))
}

/// History is best effort; a broken database never fails the sync.
fn record(run: &SyncRun) {
    let result = GitsubConfig::db_path()
        .map_err(anyhow::Error::from)
        .and_then(|path| gitsub_db::open_db(&path))
        .and_then(|conn| gitsub_db::ops::insert_run(&conn, run));
    if let Err(e) = result {
        tracing::warn!("could not record run {}: {e}", run.id);
    }
}

fn exit_code(config: &GitsubConfig, run: &SyncRun) -> i32 {
    if config.fail_on_error && run.has_failures() {
        EXIT_SUBMODULE_FAILURES
    } else {
        0
    }
}
