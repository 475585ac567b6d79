//! Configuration management
//!
//! Reads the JSONC keymap file: comments are stripped, the JSON tree is
//! parsed tolerantly into a [`Config`], and default paths come from `$HOME`.

pub mod jsonc;
pub mod model;
pub mod paths;

pub use model::{Config, Keymap};
pub use paths::Paths;
