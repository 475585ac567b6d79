//! Hyprland bind line rendering
//!
//! Each enabled keymap becomes one `bind = MODS, KEYS, exec, COMMAND` line.
//! Tokens are spliced into the template one at a time: modifiers land
//! before the first comma, everything else before the second.

use tracing::{debug, info};

use crate::config::{Config, Keymap};
use crate::constants::render::{BIND_TEMPLATE, MAINMOD_TOKEN, MAINMOD_VARIABLE, MODIFIERS};

/// Slot a key-sequence token is rendered into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Modifier,
    Key,
}

impl Slot {
    fn of(token: &str) -> Self {
        if MODIFIERS.contains(&token) {
            Slot::Modifier
        } else {
            Slot::Key
        }
    }

    /// Index of the comma the token is inserted in front of
    fn comma_index(self) -> usize {
        match self {
            Slot::Modifier => 0,
            Slot::Key => 1,
        }
    }
}

/// Render one keymap as a bind line, without a trailing newline.
///
/// `MAINMOD` is written as the `$mainMod` variable; defining it is left to
/// the Hyprland config.
pub fn render_line(keymap: &Keymap) -> String {
    let mut line = String::from(BIND_TEMPLATE);
    line.push_str(&keymap.command);
    let mut filled = [false; 2];

    for token in &keymap.key_sequence {
        // Classified before substitution so MAINMOD stays a modifier
        let slot = Slot::of(token);
        let text = if token == MAINMOD_TOKEN {
            MAINMOD_VARIABLE
        } else {
            token.as_str()
        };

        // Positions move as tokens are inserted, so look them up every time
        let index = slot.comma_index();
        let at = line
            .match_indices(',')
            .nth(index)
            .map(|(i, _)| i)
            .unwrap_or(line.len());

        // The template's own space separates the first token of a slot
        if filled[index] {
            line.insert_str(at, &format!(" {}", text));
        } else {
            line.insert_str(at, text);
            filled[index] = true;
        }
    }

    debug!(line = %line, "Rendered keymap");
    line
}

/// Render every enabled keymap, in config order.
///
/// Returns no lines at all when `globals.enable_all` is false.
pub fn render_block(config: &Config) -> Vec<String> {
    if !config.globals.enable_all {
        info!("enable_all is false, generating an empty block");
        return Vec::new();
    }

    config.enabled_keymaps().map(render_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keymap(keys: &[&str], command: &str) -> Keymap {
        Keymap {
            key_sequence: keys.iter().map(|k| k.to_string()).collect(),
            command: command.to_string(),
            ..Keymap::default()
        }
    }

    #[test]
    fn test_modifier_and_key() {
        assert_eq!(
            render_line(&keymap(&["SUPER", "a"], "firefox")),
            "bind = SUPER, a, exec, firefox"
        );
    }

    #[test]
    fn test_mainmod_becomes_variable() {
        assert_eq!(
            render_line(&keymap(&["MAINMOD", "q"], "kill")),
            "bind = $mainMod, q, exec, kill"
        );
    }

    #[test]
    fn test_modifiers_accumulate_in_order() {
        assert_eq!(
            render_line(&keymap(&["SUPER", "SHIFT", "CONTROL", "Return"], "kitty")),
            "bind = SUPER SHIFT CONTROL, Return, exec, kitty"
        );
    }

    #[test]
    fn test_multiple_keys_keep_first_token_first() {
        assert_eq!(
            render_line(&keymap(&["SUPER", "a", "b"], "cmd")),
            "bind = SUPER, a b, exec, cmd"
        );
    }

    #[test]
    fn test_key_before_modifier_still_lands_in_key_slot() {
        assert_eq!(
            render_line(&keymap(&["a", "MAINMOD"], "cmd")),
            "bind = $mainMod, a, exec, cmd"
        );
    }

    #[test]
    fn test_key_only() {
        assert_eq!(
            render_line(&keymap(&["Print"], "grim")),
            "bind = , Print, exec, grim"
        );
    }

    #[test]
    fn test_modifier_words_are_case_sensitive() {
        assert_eq!(
            render_line(&keymap(&["super", "a"], "cmd")),
            "bind = , super a, exec, cmd"
        );
    }

    #[test]
    fn test_commas_in_command_do_not_move_slots() {
        assert_eq!(
            render_line(&keymap(&["SUPER", "n"], "notify-send a,b,c")),
            "bind = SUPER, n, exec, notify-send a,b,c"
        );
    }

    #[test]
    fn test_block_skips_disabled_keymaps() {
        let mut disabled = keymap(&["SUPER", "x"], "never");
        disabled.enabled = false;
        let config = Config {
            keymaps: vec![keymap(&["SUPER", "a"], "one"), disabled, keymap(&["b"], "two")],
            ..Config::default()
        };

        assert_eq!(
            render_block(&config),
            vec!["bind = SUPER, a, exec, one", "bind = , b, exec, two"]
        );
    }

    #[test]
    fn test_enable_all_false_renders_nothing() {
        let mut config = Config {
            keymaps: vec![keymap(&["SUPER", "a"], "one")],
            ..Config::default()
        };
        config.globals.enable_all = false;
        assert!(render_block(&config).is_empty());
    }

    #[test]
    fn test_parsed_scenarios() {
        let report =
            Config::parse(r#"{"keymaps":[{"key-sequence":["SUPER","a"],"command":"firefox"}]}"#)
                .unwrap();
        assert_eq!(
            render_block(&report.config),
            vec!["bind = SUPER, a, exec, firefox"]
        );

        let report = Config::parse(
            r#"{"globals":{"mainmod":"ALT"},"keymaps":[{"key-sequence":["MAINMOD","q"],"command":"kill"}]}"#,
        )
        .unwrap();
        assert_eq!(
            render_block(&report.config),
            vec!["bind = $mainMod, q, exec, kill"]
        );
    }
}
