//! Generated block synchronization
//!
//! Owns the marker-delimited region of the Hyprland config. Every run cuts
//! out the previous block, appends a freshly rendered one after the user's
//! own lines and atomically replaces the file. Runs with unchanged input
//! leave the file's bytes alone.

pub mod backup;
pub mod lock;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};

use crate::constants::block::{END_MARKER, START_MARKER};

pub use backup::BackupManager;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("could not read keybinds file {path:?}")]
    TargetFileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write keybinds file {path:?}")]
    TargetFileUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not lock keybinds file {path:?}")]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not back up keybinds file {path:?}")]
    Backup {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("could not restore backup {filename}")]
    Restore {
        filename: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// What a synchronization run did to the target file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Content already matched; the file was not touched
    Unchanged,
    /// File was replaced, optionally after archiving the previous content
    Written { backup: Option<PathBuf> },
}

fn is_marker(line: &str, marker: &str) -> bool {
    line.trim_end() == marker
}

/// Build the generated block: markers, blank separators and one line per bind.
pub fn block_text(lines: &[String]) -> String {
    let mut block = String::new();
    block.push_str(START_MARKER);
    block.push_str("\n\n");
    for line in lines {
        block.push_str(line);
        block.push('\n');
    }
    block.push('\n');
    block.push_str(END_MARKER);
    block.push('\n');
    block
}

/// Replace any generated block in `existing` with a fresh one built from `lines`.
///
/// Everything outside start/end marker pairs is kept byte for byte and in
/// order; the new block always goes at the end. A start marker without a
/// matching end marker only loses the marker line itself.
pub fn splice(existing: &str, lines: &[String]) -> String {
    let mut preserved = String::with_capacity(existing.len());
    // Lines after an open start marker, held back until its end marker shows up
    let mut pending: Option<String> = None;

    for line in existing.split_inclusive('\n') {
        if let Some(held) = pending.as_mut() {
            if is_marker(line, END_MARKER) {
                pending = None;
            } else {
                held.push_str(line);
            }
        } else if is_marker(line, START_MARKER) {
            pending = Some(String::new());
        } else {
            preserved.push_str(line);
        }
    }

    if let Some(held) = pending {
        warn!("Generated block has no end marker, keeping the lines after it");
        preserved.push_str(&held);
    }

    if !preserved.is_empty() && !preserved.ends_with('\n') {
        preserved.push('\n');
    }
    preserved.push_str(&block_text(lines));
    preserved
}

/// Writes generated blocks into one target file
pub struct Synchronizer {
    target: PathBuf,
    backups: Option<BackupManager>,
}

impl Synchronizer {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            backups: None,
        }
    }

    /// Archive the current content before each rewrite.
    pub fn with_backups(mut self, backups: BackupManager) -> Self {
        self.backups = Some(backups);
        self
    }

    /// The file actually written; symlinks are followed so the link survives.
    fn resolved_target(&self) -> PathBuf {
        fs::canonicalize(&self.target).unwrap_or_else(|_| self.target.clone())
    }

    /// Current content, or `None` when the file does not exist yet.
    fn read_existing(path: &Path) -> Result<Option<String>, SyncError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SyncError::TargetFileUnreadable {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Compute the merged file content without writing anything.
    pub fn preview(&self, lines: &[String]) -> Result<String, SyncError> {
        let existing = Self::read_existing(&self.resolved_target())?.unwrap_or_default();
        Ok(splice(&existing, lines))
    }

    /// Merge `lines` into the target file.
    pub fn run(&self, lines: &[String]) -> Result<Outcome, SyncError> {
        let path = self.resolved_target();
        ensure_parent_dir(&path)?;

        let _lock = lock::acquire(&path).map_err(|source| SyncError::Lock {
            path: path.clone(),
            source,
        })?;

        let existing = Self::read_existing(&path)?;
        let merged = splice(existing.as_deref().unwrap_or_default(), lines);

        if existing.as_deref() == Some(merged.as_str()) {
            info!("Keybinds in {:?} are up to date", path);
            return Ok(Outcome::Unchanged);
        }

        let backup = match (&self.backups, existing.is_some()) {
            (Some(backups), true) => Some(backups.create_backup(&path).map_err(|e| {
                SyncError::Backup {
                    path: path.clone(),
                    source: e.into(),
                }
            })?),
            _ => None,
        };

        write_atomically(&path, merged.as_bytes())?;
        info!("Wrote {} keybind(s) to {:?}", lines.len(), path);

        if let Some(backups) = &self.backups
            && let Err(e) = backups.prune_backups()
        {
            warn!("Failed to prune old backups: {:#}", e);
        }

        Ok(Outcome::Written { backup })
    }

    /// Replace the target with the content of a backup archive.
    pub fn restore(&self, backups: &BackupManager, filename: &str) -> Result<(), SyncError> {
        let path = self.resolved_target();
        ensure_parent_dir(&path)?;

        let _lock = lock::acquire(&path).map_err(|source| SyncError::Lock {
            path: path.clone(),
            source,
        })?;

        let contents = backups
            .read_backup(filename)
            .map_err(|e| SyncError::Restore {
                filename: filename.to_string(),
                source: e.into(),
            })?;

        write_atomically(&path, &contents)?;
        info!("Restored {:?} from backup {}", path, filename);
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), SyncError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| SyncError::TargetFileUnwritable {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Write to a temp file beside `path`, then rename it into place.
///
/// Permissions of an existing file are carried over.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), SyncError> {
    let unwritable = |source: io::Error| SyncError::TargetFileUnwritable {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(unwritable)?;
    tmp.write_all(contents).map_err(unwritable)?;

    if let Some(permissions) = target_permissions(path) {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(unwritable)?;
    }
    tmp.as_file().sync_all().map_err(unwritable)?;
    tmp.persist(path).map_err(|e| unwritable(e.error))?;
    Ok(())
}

/// Mode for the replacement file: the current file's, or 0666 minus the
/// umask when the file is new, matching a plain `File::create`.
fn target_permissions(path: &Path) -> Option<fs::Permissions> {
    match fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => new_file_permissions(),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use nix::sys::stat::{Mode, umask};
    use std::os::unix::fs::PermissionsExt;

    // The umask can only be read by replacing it
    let mask = umask(Mode::empty());
    umask(mask);

    let mode = Mode::from_bits_truncate(0o666) & !mask;
    Some(fs::Permissions::from_mode(u32::from(mode.bits())))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}
