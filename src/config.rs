//! Runtime configuration for dispatching.
//!
//! Settings are layered: `cmdforge.toml` → environment → CLI flags.
//!
//! ```toml
//! debug = false
//! prefix_matching = true
//! search_path = "/opt/tools/bin:/usr/bin"
//! width = 100
//! color = true
//! ```
//!
//! | Variable                  | Field             |
//! |---------------------------|-------------------|
//! | `CMDFORGE_DEBUG`          | `debug`           |
//! | `CMDFORGE_PREFIX_MATCHING`| `prefix_matching` |
//! | `CMDFORGE_PATH`           | `search_path`     |
//! | `CMDFORGE_WIDTH`          | `width`           |

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// File name of the configuration file.
pub const CONFIG_FILE: &str = "cmdforge.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Propagate recoverable errors instead of reporting them
    pub debug: bool,
    /// Resolve unambiguous prefixes of task names and aliases
    pub prefix_matching: bool,
    /// Search path for wrapped executables (default: `PATH`)
    pub search_path: Option<String>,
    /// Help output width (default: terminal width)
    pub width: Option<usize>,
    /// Style error output
    pub color: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            debug: false,
            prefix_matching: true,
            search_path: None,
            width: None,
            color: true,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse cmdforge.toml")
    }

    /// Load `path`, or the default location when `path` is `None`.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// `<config dir>/cmdforge/cmdforge.toml`, when a config dir exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cmdforge").join(CONFIG_FILE))
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize cmdforge.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn from_env(self) -> Result<Self> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("CMDFORGE_DEBUG") {
            self.debug = parse_bool("CMDFORGE_DEBUG", &value)?;
        }
        if let Some(value) = lookup("CMDFORGE_PREFIX_MATCHING") {
            self.prefix_matching = parse_bool("CMDFORGE_PREFIX_MATCHING", &value)?;
        }
        if let Some(value) = lookup("CMDFORGE_PATH")
            && !value.is_empty()
        {
            self.search_path = Some(value);
        }
        if let Some(value) = lookup("CMDFORGE_WIDTH") {
            let width = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid CMDFORGE_WIDTH '{}': expected a number", value))?;
            self.width = Some(width);
        }
        Ok(self)
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(width) = self.width
            && width < 20
        {
            warnings.push(format!(
                "Width {} is too narrow for help output; at least 20 columns are recommended",
                width
            ));
        }

        if let Some(path) = &self.search_path {
            for dir in std::env::split_paths(path) {
                if !dir.as_os_str().is_empty() && !dir.is_dir() {
                    warnings.push(format!(
                        "Search path entry '{}' is not a directory",
                        dir.display()
                    ));
                }
            }
        }

        warnings
    }

    pub fn search_path_os(&self) -> Option<OsString> {
        self.search_path.as_ref().map(OsString::from)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => anyhow::bail!("Invalid {} '{}': expected true or false", key, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert!(!config.debug);
        assert!(config.prefix_matching);
        assert!(config.color);
        assert!(config.search_path.is_none());
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = RuntimeConfig::parse("debug = true\nwidth = 100\n").unwrap();
        assert!(config.debug);
        assert_eq!(config.width, Some(100));
        assert!(config.prefix_matching);
    }

    #[test]
    fn test_parse_invalid_toml_fails() {
        let err = RuntimeConfig::parse("debug = maybe").unwrap_err();
        assert!(err.to_string().contains("cmdforge.toml"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = RuntimeConfig {
            debug: true,
            search_path: Some("/opt/bin".into()),
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(RuntimeConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_or_default_explicit_missing_path_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(RuntimeConfig::load_or_default(Some(&missing)).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = RuntimeConfig::default()
            .apply_env(env(&[
                ("CMDFORGE_DEBUG", "1"),
                ("CMDFORGE_PREFIX_MATCHING", "off"),
                ("CMDFORGE_PATH", "/a:/b"),
                ("CMDFORGE_WIDTH", "60"),
            ]))
            .unwrap();
        assert!(config.debug);
        assert!(!config.prefix_matching);
        assert_eq!(config.search_path.as_deref(), Some("/a:/b"));
        assert_eq!(config.width, Some(60));
    }

    #[test]
    fn test_env_invalid_values_fail() {
        assert!(
            RuntimeConfig::default()
                .apply_env(env(&[("CMDFORGE_DEBUG", "sometimes")]))
                .is_err()
        );
        assert!(
            RuntimeConfig::default()
                .apply_env(env(&[("CMDFORGE_WIDTH", "wide")]))
                .is_err()
        );
    }

    #[test]
    fn test_validate_warnings() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let config = RuntimeConfig {
            width: Some(10),
            search_path: Some(format!("{}:{}", dir.path().display(), missing.display())),
            ..Default::default()
        };
        let warnings = config.validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("too narrow"));
        assert!(warnings[1].contains("nope"));
        assert!(RuntimeConfig::default().validate().is_empty());
    }
}
