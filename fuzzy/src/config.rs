//! Command line configuration.
//!
//! Settings are layered: built-in defaults, then a `.env` file, then the
//! process environment, then command line flags (applied by `main`).

use fuzzy_core::{EngineConfig, ShapePolicy};
use std::path::PathBuf;

/// Log filter used when nothing else is configured.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Settings shared by all subcommands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// `tracing` filter directive, e.g. `info` or `fuzzy_core=debug`.
    pub log_level: String,
    /// Directory used by `list` when none is given.
    pub area_dir: PathBuf,
    /// Refuse to evaluate areas with unusable fuzzy sets.
    pub strict: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            area_dir: PathBuf::from("."),
            strict: false,
        }
    }
}

impl CliConfig {
    /// Load from `.env` (if present) and the environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to read `FUZZY_LOG`, `FUZZY_AREA_DIR` and `FUZZY_STRICT`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(level) = lookup("FUZZY_LOG").filter(|v| !v.trim().is_empty()) {
            config.log_level = level;
        }
        if let Some(dir) = lookup("FUZZY_AREA_DIR").filter(|v| !v.trim().is_empty()) {
            config.area_dir = PathBuf::from(dir);
        }
        if let Some(strict) = lookup("FUZZY_STRICT") {
            config.strict = parse_flag(&strict);
        }
        config
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Engine settings implied by this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        let policy = if self.strict {
            ShapePolicy::Strict
        } else {
            ShapePolicy::Lenient
        };
        EngineConfig::new().with_shape_policy(policy)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CliConfig::from_lookup(lookup(&[]));
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.engine_config().shape_policy, ShapePolicy::Lenient);
    }

    #[test]
    fn test_environment() {
        let config = CliConfig::from_lookup(lookup(&[
            ("FUZZY_LOG", "fuzzy_core=debug"),
            ("FUZZY_AREA_DIR", "/srv/areas"),
            ("FUZZY_STRICT", "Yes"),
        ]));
        assert_eq!(config.log_level, "fuzzy_core=debug");
        assert_eq!(config.area_dir, PathBuf::from("/srv/areas"));
        assert!(config.strict);
        assert_eq!(config.engine_config().shape_policy, ShapePolicy::Strict);
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = CliConfig::from_lookup(lookup(&[("FUZZY_LOG", " "), ("FUZZY_STRICT", "0")]));
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(!config.strict);
    }

    #[test]
    fn test_flags_override() {
        let config = CliConfig::from_lookup(lookup(&[("FUZZY_LOG", "info")]))
            .with_log_level("trace")
            .with_strict(true);
        assert_eq!(config.log_level, "trace");
        assert!(config.strict);
    }
}
