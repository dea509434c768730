pub mod config;
pub mod history;
pub mod list;
pub mod sync;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Command {
    /// Pull the superproject, then bring every submodule to a branch tip
    Sync(sync::SyncArgs),
    /// List the submodules declared in the manifest
    List(list::ListArgs),
    /// Show past sync runs
    History(history::HistoryArgs),
    /// Initialize and show gitsub configuration
    Config {
        #[command(subcommand)]
        action: config::ConfigAction,
    },
}

/// Run a command and return the process exit code.
pub async fn run(cmd: Command) -> anyhow::Result<i32> {
    match cmd {
        Command::Sync(args) => sync::run(args).await,
        Command::List(args) => list::run(args).map(|_| 0),
        Command::History(args) => history::run(args).map(|_| 0),
        Command::Config { action } => config::run(action).map(|_| 0),
    }
}
