use clap::Subcommand;
use gitsub_core::config::GitsubConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Initialize ~/.gitsub/ with default config and history database
    Init,
    /// Show current configuration
    Show,
}

pub fn run(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let home = GitsubConfig::init()?;
            let db_path = GitsubConfig::db_path()?;

            gitsub_db::open_db(&db_path)?;

            println!("Initialized gitsub at {}", home.display());
            println!("  config: {}", GitsubConfig::config_path()?.display());
            println!("  database: {}", db_path.display());
            Ok(())
        }
        ConfigAction::Show => {
            let config = GitsubConfig::load()?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{toml_str}");
            Ok(())
        }
    }
}
