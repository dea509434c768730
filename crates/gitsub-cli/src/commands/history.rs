use clap::Args;
use comfy_table::{Cell, Color, Table};
use gitsub_core::config::GitsubConfig;

#[derive(Args)]
pub struct HistoryArgs {
    /// Number of runs to show
    #[arg(long, default_value = "20")]
    limit: u32,
    /// Also list the failing submodules of each run
    #[arg(long)]
    failures: bool,
}

pub fn run(args: HistoryArgs) -> anyhow::Result<()> {
    let db_path = GitsubConfig::db_path()?;
    let conn = gitsub_db::open_db(&db_path)?;

    let runs = gitsub_db::ops::list_runs(&conn, args.limit)?;
    if runs.is_empty() {
        println!("No sync history found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["STARTED", "ROOT", "BRANCH", "TOTAL", "FAILED", "DURATION"]);
    for run in &runs {
        let failed = if run.manifest_missing {
            Cell::new("no manifest").fg(Color::Yellow)
        } else if run.failed > 0 {
            Cell::new(run.failed.to_string()).fg(Color::Red)
        } else {
            Cell::new("0").fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(run.started_at.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(run.root.display()),
            Cell::new(&run.branch),
            Cell::new(run.total.to_string()),
            failed,
            Cell::new(format!("{:.1}s", run.elapsed().num_milliseconds() as f64 / 1000.0)),
        ]);
    }
    println!("{table}");

    if args.failures {
        for run in runs.iter().filter(|r| r.failed > 0) {
            println!("\nFailures in run {} ({}):", run.id, run.started_at.format("%Y-%m-%d %H:%M"));
            for outcome in gitsub_db::ops::get_run_outcomes(&conn, &run.id)?
                .iter()
                .filter(|o| !o.is_success())
            {
                let kind = outcome.failure.map(|k| k.to_string()).unwrap_or_default();
                println!("  {} [{kind}]", outcome.submodule);
                for line in outcome.message.lines() {
                    println!("    {line}");
                }
            }
        }
    }

    Ok(())
}
