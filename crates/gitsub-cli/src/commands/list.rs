use std::path::PathBuf;

use clap::Args;
use comfy_table::{Cell, Color, Table};
use gitsub_core::config::GitsubConfig;
use gitsub_core::error::GitsubError;
use gitsub_core::manifest;

#[derive(Args)]
pub struct ListArgs {
    /// Superproject root (defaults to the current directory)
    #[arg(long)]
    root: Option<PathBuf>,
}

pub fn run(args: ListArgs) -> anyhow::Result<()> {
    let config = GitsubConfig::load()?;
    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    let text = match manifest::read_manifest(&root.join(&config.manifest_file)) {
        Ok(text) => text,
        Err(GitsubError::ManifestMissing { .. }) => {
            println!("{} file not found", config.manifest_file);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let entries = manifest::parse_entries(&text);
    if entries.is_empty() {
        println!("No submodules declared in {}.", config.manifest_file);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["NAME", "PATH", "URL", "BRANCH", "ON DISK"]);

    for entry in &entries {
        let on_disk = root.join(entry.path.as_str()).is_dir();
        let (disk_str, disk_color) = if on_disk {
            ("yes", Color::Green)
        } else {
            ("no", Color::Red)
        };
        table.add_row(vec![
            Cell::new(&entry.name),
            Cell::new(entry.path.as_str()),
            Cell::new(entry.url.as_deref().unwrap_or("—")),
            Cell::new(entry.branch.as_deref().unwrap_or("—")),
            Cell::new(disk_str).fg(disk_color),
        ]);
    }

    println!("{table}");
    println!("{} submodules", entries.len());
    Ok(())
}
