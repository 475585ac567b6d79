//! Advisory locking around the target file's read-modify-write
//!
//! The lock lives on a sidecar file because the target itself is replaced
//! by rename, which would leave waiters holding a lock on a dead inode.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::block::LOCK_SUFFIX;

/// Sidecar lock path for `target`: `.<name>.catalyst.lock` in the same directory
pub fn lock_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}{}", name, LOCK_SUFFIX))
}

/// Exclusive lock held until dropped
#[cfg(unix)]
pub struct TargetLock {
    _flock: nix::fcntl::Flock<File>,
}

#[cfg(not(unix))]
pub struct TargetLock;

/// Block until the lock for `target` is held.
pub fn acquire(target: &Path) -> io::Result<TargetLock> {
    let path = lock_path(target);
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(&path)?;

    debug!("Waiting for lock {:?}", path);
    let lock = lock_file(file)?;
    debug!("Acquired lock {:?}", path);
    Ok(lock)
}

#[cfg(unix)]
fn lock_file(file: File) -> io::Result<TargetLock> {
    use nix::fcntl::{Flock, FlockArg};

    let flock =
        Flock::lock(file, FlockArg::LockExclusive).map_err(|(_, errno)| io::Error::from(errno))?;
    Ok(TargetLock { _flock: flock })
}

#[cfg(not(unix))]
fn lock_file(_file: File) -> io::Result<TargetLock> {
    Ok(TargetLock)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_path_is_hidden_sibling() {
        assert_eq!(
            lock_path(Path::new("/home/u/.config/hypr/hyprland.conf")),
            PathBuf::from("/home/u/.config/hypr/.hyprland.conf.catalyst.lock")
        );
    }

    #[test]
    fn test_lock_can_be_reacquired_after_drop() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("hyprland.conf");

        let first = acquire(&target).unwrap();
        assert!(lock_path(&target).exists());
        drop(first);

        let _second = acquire(&target).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_held_lock_excludes_other_holders() {
        use nix::fcntl::{Flock, FlockArg};

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("hyprland.conf");
        let try_lock = || {
            let file = OpenOptions::new().write(true).open(lock_path(&target)).unwrap();
            Flock::lock(file, FlockArg::LockExclusiveNonblock).is_ok()
        };

        let held = acquire(&target).unwrap();
        assert!(!try_lock());

        drop(held);
        assert!(try_lock());
    }
}
