//! Keybinds file backups
//!
//! Before catalyst rewrites the Hyprland config, the previous content can be
//! archived as a .tar.gz in a 'backups' directory next to the keymap config.

use std::ffi::OsStr;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tracing::{error, info};

use crate::constants::backup::{DEFAULT_RETENTION, ENTRY_NAME, PREFIX};

/// Represents a backup file
#[derive(Debug, Clone)]
pub struct BackupEntry {
    pub filename: String,
    pub path: PathBuf,
    pub timestamp: SystemTime,
}

#[derive(Debug, Clone)]
pub struct BackupManager {
    dir: PathBuf,
    retention: usize,
}

impl BackupManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            retention: DEFAULT_RETENTION,
        }
    }

    /// Number of archives kept by [`BackupManager::prune_backups`]
    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention;
        self
    }

    /// Archive the file at `source`
    pub fn create_backup(&self, source: &Path) -> Result<PathBuf> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).context("Failed to create backup directory")?;
        }

        // Filename: backup_YYYYMMDD_HHMMSS_mmm.tar.gz, sorts chronologically
        let datetime: chrono::DateTime<chrono::Local> = SystemTime::now().into();
        let stem = format!("{}_{}", PREFIX, datetime.format("%Y%m%d_%H%M%S_%3f"));
        let mut backup_path = self.dir.join(format!("{}.tar.gz", stem));
        let mut attempt = 1;
        while backup_path.exists() {
            backup_path = self.dir.join(format!("{}_{}.tar.gz", stem, attempt));
            attempt += 1;
        }

        let mut file = fs::File::open(source)
            .with_context(|| format!("Failed to open {:?} for backup", source))?;

        let tar_gz = fs::File::create(&backup_path).context("Failed to create backup file")?;
        let enc = GzEncoder::new(tar_gz, Compression::default());
        let mut tar = tar::Builder::new(enc);

        tar.append_file(ENTRY_NAME, &mut file)
            .context("Failed to add keybinds file to archive")?;
        tar.into_inner()
            .context("Failed to finish backup archive")?
            .finish()
            .context("Failed to finish backup compression")?;

        info!("Created backup: {:?}", backup_path);
        Ok(backup_path)
    }

    /// List all available backups, newest first
    pub fn list_backups(&self) -> Result<Vec<BackupEntry>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            let filename = entry.file_name().to_string_lossy().to_string();
            if filename.starts_with(PREFIX) && filename.ends_with(".tar.gz") {
                let timestamp = fs::metadata(&path)?
                    .modified()
                    .unwrap_or(SystemTime::UNIX_EPOCH);

                backups.push(BackupEntry {
                    filename,
                    path,
                    timestamp,
                });
            }
        }

        // Filenames carry the creation time, mtime breaks ties for foreign names
        backups.sort_by(|a, b| {
            b.filename
                .cmp(&a.filename)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });

        Ok(backups)
    }

    /// Read the archived keybinds file out of a backup
    pub fn read_backup(&self, filename: &str) -> Result<Vec<u8>> {
        // Only bare names inside the backup directory
        if Path::new(filename).file_name() != Some(OsStr::new(filename)) {
            return Err(anyhow::anyhow!("Invalid backup name: {}", filename));
        }

        let backup_path = self.dir.join(filename);
        if !backup_path.exists() {
            return Err(anyhow::anyhow!("Backup file not found: {}", filename));
        }

        let tar_gz = fs::File::open(&backup_path).context("Failed to open backup file")?;
        let mut archive = tar::Archive::new(GzDecoder::new(tar_gz));

        for entry in archive.entries().context("Failed to read backup archive")? {
            let mut entry = entry.context("Corrupt backup archive entry")?;
            let is_keybinds = entry.path()? == Path::new(ENTRY_NAME);
            if is_keybinds {
                let mut contents = Vec::new();
                entry
                    .read_to_end(&mut contents)
                    .context("Failed to extract keybinds file")?;
                return Ok(contents);
            }
        }

        Err(anyhow::anyhow!(
            "Backup {} does not contain {}",
            filename,
            ENTRY_NAME
        ))
    }

    /// Delete backups beyond the retention count, oldest first
    pub fn prune_backups(&self) -> Result<()> {
        let backups = self.list_backups()?;

        if backups.len() > self.retention {
            for backup in &backups[self.retention..] {
                if let Err(e) = fs::remove_file(&backup.path) {
                    error!("Failed to prune backup {:?}: {}", backup.path, e);
                } else {
                    info!("Pruned old backup: {:?}", backup.filename);
                }
            }
        }
        Ok(())
    }
}
