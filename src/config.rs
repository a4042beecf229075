// ⚙️ Configuration
// Defaults, overridden by environment variables, overridden by CLI flags

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_MARKER: char = '-';
pub const DEFAULT_CONTINUATION_INDENT: usize = 3;

pub const ENV_DB: &str = "PUZZLE_DB";
pub const ENV_EXPORT_DIR: &str = "PUZZLE_EXPORT_DIR";
pub const ENV_BACKUP_DIR: &str = "PUZZLE_BACKUP_DIR";
pub const ENV_BIND: &str = "PUZZLE_BIND";

// ============================================================================
// PARSER CONFIG
// ============================================================================

/// Layout of the raw dump
///
/// Every structural line starts with `marker`. A marker followed by at least
/// `continuation_indent` whitespace characters is a word line; anything
/// shallower is a category header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    pub marker: char,
    pub continuation_indent: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            marker: DEFAULT_MARKER,
            continuation_indent: DEFAULT_CONTINUATION_INDENT,
        }
    }
}

impl ParserConfig {
    /// Builder pattern: override the line marker
    pub fn with_marker(mut self, marker: char) -> Self {
        self.marker = marker;
        self
    }

    /// Builder pattern: override the continuation indent (minimum 1)
    pub fn with_continuation_indent(mut self, indent: usize) -> Self {
        self.continuation_indent = indent.max(1);
        self
    }
}

// ============================================================================
// APPLICATION CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub db_path: PathBuf,
    pub export_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub bind_addr: String,
    pub parser: ParserConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from("puzzles.db"),
            export_dir: PathBuf::from("export"),
            backup_dir: PathBuf::from("backups"),
            bind_addr: "127.0.0.1:3000".to_string(),
            parser: ParserConfig::default(),
        }
    }
}

impl Config {
    /// Defaults overlaid with any PUZZLE_* environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` with an injectable lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(v) = lookup(ENV_DB).filter(|v| !v.is_empty()) {
            config.db_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_EXPORT_DIR).filter(|v| !v.is_empty()) {
            config.export_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_BACKUP_DIR).filter(|v| !v.is_empty()) {
            config.backup_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_BIND).filter(|v| !v.is_empty()) {
            config.bind_addr = v;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.parser.marker, '-');
        assert_eq!(config.parser.continuation_indent, 3);
        assert_eq!(config.db_path, PathBuf::from("puzzles.db"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> =
            [(ENV_DB, "/tmp/p.db"), (ENV_BIND, "0.0.0.0:8080"), (ENV_EXPORT_DIR, "")]
                .into_iter()
                .collect();
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.db_path, PathBuf::from("/tmp/p.db"));
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        // Empty values fall back to defaults
        assert_eq!(config.export_dir, PathBuf::from("export"));
    }

    #[test]
    fn test_indent_floor() {
        let cfg = ParserConfig::default().with_continuation_indent(0);
        assert_eq!(cfg.continuation_indent, 1);
    }
}
