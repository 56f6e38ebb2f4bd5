//! Highlighter configuration.
//!
//! Stored as JSON. Every field has a default, so an empty object (or no file at all) is a
//! valid configuration.

use crate::stx::{DEFAULT_SNIFF_LEN, RESTYLE_JUMP, RestyleOptions, SyntaxError, SyntaxSet};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Environment variable holding extra grammar directories, in the platform's path-list format.
pub const SYNTAX_PATH_ENV: &str = "ADIE_SYNTAX_PATH";

/// Grammar file loaded when none is configured.
pub const DEFAULT_SYNTAX_FILE: &str = "Adie.stx";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Settings shared by every highlighted buffer.
pub struct HighlightConfig {
    /// Directories searched for `syntax_file`.
    pub search_paths: Vec<PathBuf>,
    /// Grammar file name, resolved against `search_paths`.
    pub syntax_file: String,
    /// Initial widening step of the incremental restyle.
    pub restyle_jump: usize,
    /// Bytes inspected when guessing a language from content.
    pub sniff_len: usize,
    /// Whether buffers are colorized at all.
    pub colorize: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Style table file.
    pub theme: Option<PathBuf>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            syntax_file: DEFAULT_SYNTAX_FILE.to_string(),
            restyle_jump: RESTYLE_JUMP,
            sniff_len: DEFAULT_SNIFF_LEN,
            colorize: true,
            theme: None,
        }
    }
}

impl HighlightConfig {
    /// Read a configuration file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SyntaxError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Append the directories listed in `value` (an `ADIE_SYNTAX_PATH`-style list).
    pub fn extend_search_paths(&mut self, value: &OsStr) {
        self.search_paths.extend(
            std::env::split_paths(value).filter(|p| !p.as_os_str().is_empty()),
        );
    }

    /// Append the directories from [`SYNTAX_PATH_ENV`], if set.
    pub fn apply_env(&mut self) {
        if let Some(value) = std::env::var_os(SYNTAX_PATH_ENV) {
            self.extend_search_paths(&value);
        }
    }

    /// Restyle options derived from this configuration.
    pub fn restyle_options(&self) -> RestyleOptions {
        RestyleOptions {
            jump: self.restyle_jump,
        }
    }

    /// An empty syntax set with this configuration's search path and sniff length.
    pub fn syntax_set(&self) -> SyntaxSet {
        let mut set = SyntaxSet::new();
        for path in &self.search_paths {
            set.add_search_path(path);
        }
        set.set_sniff_len(self.sniff_len);
        set
    }

    /// Build the syntax set and load the configured grammar file into it.
    pub fn load_syntax_set(&self) -> Result<SyntaxSet, SyntaxError> {
        let mut set = self.syntax_set();
        set.load_by_name(&self.syntax_file)?;
        Ok(set)
    }
}
