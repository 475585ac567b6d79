//! Application-wide constants
//!
//! Paths, sentinel markers and the fixed bind template live here so the
//! parser, renderer and synchronizer agree on a single source of truth.

/// Default file locations, relative to the user's home directory
pub mod paths {
    /// Environment variable consulted to resolve default paths
    pub const HOME_ENV: &str = "HOME";

    /// Default JSONC keymap configuration
    pub const CONFIG_FILE: &str = ".config/catalyst/config.jsonc";

    /// Default Hyprland configuration receiving the generated block
    pub const TARGET_FILE: &str = ".config/hypr/hyprland.conf";
}

/// JSON member names understood by the config parser
pub mod keys {
    pub const SCHEMA: &str = "$schema";
    pub const GLOBALS: &str = "globals";
    pub const KEYMAPS: &str = "keymaps";

    pub const MAINMOD: &str = "mainmod";
    pub const ENABLE_ALL: &str = "enable_all";

    pub const NAME: &str = "name";
    pub const KEY_SEQUENCE: &str = "key-sequence";
    pub const COMMAND: &str = "command";
    pub const ENABLED: &str = "enabled";
    pub const DESCRIPTION: &str = "description";
}

/// Hyprland bind line rendering
pub mod render {
    /// Line template: modifier slot, key slot, then the exec action
    pub const BIND_TEMPLATE: &str = "bind = , , exec, ";

    /// Reserved key-sequence word replaced by the main modifier variable
    pub const MAINMOD_TOKEN: &str = "MAINMOD";

    /// Hyprland variable the main modifier resolves to
    pub const MAINMOD_VARIABLE: &str = "$mainMod";

    /// Key-sequence words rendered into the modifier slot
    pub const MODIFIERS: &[&str] = &["CONTROL", "MAINMOD", "SHIFT", "SUPER"];
}

/// Generated block markers
pub mod block {
    /// First line of the region owned by catalyst
    pub const START_MARKER: &str = "# ------- Generated by Catalyst -------";

    /// Last line of the region owned by catalyst
    pub const END_MARKER: &str = "# ------ End of code by Catalyst ------";

    /// Suffix of the sidecar file used for advisory locking
    pub const LOCK_SUFFIX: &str = ".catalyst.lock";
}

/// Target file backups
pub mod backup {
    /// Directory (next to the keymap config) holding backup archives
    pub const SUBDIR: &str = "backups";

    /// Archive filename prefix
    pub const PREFIX: &str = "backup";

    /// Name of the target file inside each archive
    pub const ENTRY_NAME: &str = "hyprland.conf";

    /// Number of archives kept when pruning
    pub const DEFAULT_RETENTION: usize = 10;
}

/// Default configuration values
pub mod defaults {
    /// Main modifier used when `globals.mainmod` is absent
    pub const MAINMOD: &str = "SUPER";

    /// Master switch used when `globals.enable_all` is absent
    pub const ENABLE_ALL: bool = true;

    /// Keymaps are active unless explicitly disabled
    pub const KEYMAP_ENABLED: bool = true;
}
