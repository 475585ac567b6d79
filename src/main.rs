#![deny(unsafe_code)]

mod config;
mod constants;
mod render;
mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::{Config, Paths};
use crate::constants::backup::DEFAULT_RETENTION;
use crate::sync::{BackupManager, Outcome, Synchronizer};

#[derive(Parser)]
#[command(name = "catalyst")]
#[command(version)]
#[command(
    about = "Generate Hyprland keybinds from a JSONC config",
    long_about = "Reads keymaps from ~/.config/catalyst/config.jsonc and regenerates the \
                  catalyst block in ~/.config/hypr/hyprland.conf. Lines outside the block \
                  are left untouched; edits inside it are lost on the next run."
)]
struct Cli {
    /// Keymap config file (default: ~/.config/catalyst/config.jsonc)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Hyprland file receiving the generated binds (default: ~/.config/hypr/hyprland.conf)
    #[arg(long, value_name = "PATH")]
    keybinds_file: Option<PathBuf>,

    /// Print the merged keybinds file instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Print the parsed configuration as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// Archive the keybinds file before rewriting it
    #[arg(long)]
    backup: bool,

    /// Number of backup archives to keep
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_RETENTION as u16,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    keep_backups: u16,

    /// List archived keybinds files, newest first
    #[arg(long, conflicts_with_all = ["restore", "dry_run", "print_config"])]
    list_backups: bool,

    /// Restore the keybinds file from a backup archive
    #[arg(long, value_name = "FILE", conflicts_with_all = ["dry_run", "print_config"])]
    restore: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so --dry-run and --print-config output stays clean
    let default_level = if cli.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let paths = Paths::resolve(cli.config, cli.keybinds_file)?;
    let backups =
        BackupManager::new(paths.backup_dir()).with_retention(usize::from(cli.keep_backups));

    if cli.list_backups {
        for backup in backups.list_backups()? {
            println!("{}", backup.filename);
        }
        return Ok(());
    }

    let synchronizer = Synchronizer::new(&paths.target);

    if let Some(filename) = cli.restore {
        synchronizer.restore(&backups, &filename)?;
        return Ok(());
    }

    let report = Config::load(&paths.config)?;

    if cli.print_config {
        let json = serde_json::to_string_pretty(&report.config)
            .context("Failed to serialize config to JSON")?;
        println!("{}", json);
        return Ok(());
    }

    let lines = render::render_block(&report.config);

    if cli.dry_run {
        print!("{}", synchronizer.preview(&lines)?);
        return Ok(());
    }

    let synchronizer = if cli.backup {
        synchronizer.with_backups(backups)
    } else {
        synchronizer
    };

    match synchronizer.run(&lines)? {
        Outcome::Unchanged => info!("Nothing to do"),
        Outcome::Written {
            backup: Some(archive),
        } => info!("Previous keybinds saved to {:?}", archive),
        Outcome::Written { backup: None } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_backups_defaults_and_rejects_zero() {
        let cli = Cli::try_parse_from(["catalyst"]).unwrap();
        assert_eq!(usize::from(cli.keep_backups), DEFAULT_RETENTION);

        let cli = Cli::try_parse_from(["catalyst", "--backup", "--keep-backups", "3"]).unwrap();
        assert_eq!(cli.keep_backups, 3);

        assert!(Cli::try_parse_from(["catalyst", "--keep-backups", "0"]).is_err());
    }
}
