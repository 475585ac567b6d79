//! Default file locations
//!
//! Explicit paths always win; otherwise locations are derived from `$HOME`.

use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;

use crate::constants::paths;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("{env} is not set and no {what} path was given", env = paths::HOME_ENV)]
    HomeDirectoryUnset { what: &'static str },
}

/// Resolved input and output locations for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub config: PathBuf,
    pub target: PathBuf,
}

impl Paths {
    /// Resolve both paths against the process environment.
    pub fn resolve(config: Option<PathBuf>, target: Option<PathBuf>) -> Result<Self, PathError> {
        Self::resolve_with_home(config, target, std::env::var_os(paths::HOME_ENV))
    }

    /// Resolve both paths against an explicit home directory.
    ///
    /// `HOME` is only required for the paths that were not given.
    pub fn resolve_with_home(
        config: Option<PathBuf>,
        target: Option<PathBuf>,
        home: Option<OsString>,
    ) -> Result<Self, PathError> {
        let home = home.filter(|h| !h.is_empty()).map(PathBuf::from);

        let config = match config {
            Some(path) => path,
            None => home
                .as_ref()
                .map(|h| h.join(paths::CONFIG_FILE))
                .ok_or(PathError::HomeDirectoryUnset { what: "config" })?,
        };
        let target = match target {
            Some(path) => path,
            None => home
                .as_ref()
                .map(|h| h.join(paths::TARGET_FILE))
                .ok_or(PathError::HomeDirectoryUnset {
                    what: "keybinds file",
                })?,
        };

        Ok(Self { config, target })
    }

    /// Directory holding target file backups, next to the keymap config.
    pub fn backup_dir(&self) -> PathBuf {
        let mut dir = self.config.clone();
        dir.pop();
        dir.push(crate::constants::backup::SUBDIR);
        dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_home() {
        let paths = Paths::resolve_with_home(None, None, Some("/home/user".into())).unwrap();
        assert_eq!(
            paths.config,
            PathBuf::from("/home/user/.config/catalyst/config.jsonc")
        );
        assert_eq!(
            paths.target,
            PathBuf::from("/home/user/.config/hypr/hyprland.conf")
        );
    }

    #[test]
    fn test_explicit_paths_do_not_need_home() {
        let paths = Paths::resolve_with_home(
            Some("/tmp/keys.jsonc".into()),
            Some("/tmp/hyprland.conf".into()),
            None,
        )
        .unwrap();
        assert_eq!(paths.config, PathBuf::from("/tmp/keys.jsonc"));
        assert_eq!(paths.target, PathBuf::from("/tmp/hyprland.conf"));
    }

    #[test]
    fn test_missing_home_is_an_error() {
        let err = Paths::resolve_with_home(Some("/tmp/keys.jsonc".into()), None, None).unwrap_err();
        assert!(matches!(
            err,
            PathError::HomeDirectoryUnset {
                what: "keybinds file"
            }
        ));

        let err = Paths::resolve_with_home(None, None, Some(OsString::new())).unwrap_err();
        assert!(matches!(err, PathError::HomeDirectoryUnset { what: "config" }));
    }

    #[test]
    fn test_backup_dir_sits_next_to_config() {
        let paths = Paths::resolve_with_home(None, None, Some("/home/user".into())).unwrap();
        assert_eq!(
            paths.backup_dir(),
            PathBuf::from("/home/user/.config/catalyst/backups")
        );
    }
}
