mod commands;

use clap::Parser;
use tracing::Level;

#[derive(Parser)]
#[command(name = "gitsub", version, about = "Sync a superproject and all of its submodules")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let code = commands::run(cli.command).await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
