//! `uql.toml` configuration.
//!
//! ```toml
//! default_target = "mysql"
//! parameterized = true
//! allow_filtering = false
//! pretty = true
//! ```
//!
//! Lookup order: an explicit path, then `./uql.toml`, then
//! `<config dir>/uql/config.toml`. A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::{Target, TranslateOptions};
use crate::error::{UqlError, UqlResult};

pub const LOCAL_FILE: &str = "uql.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Target used when the CLI is not given `--target`.
    pub default_target: String,
    pub parameterized: bool,
    pub allow_filtering: bool,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_target: Target::default().key().to_string(),
            parameterized: false,
            allow_filtering: false,
            pretty: true,
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> UqlResult<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| UqlError::Config(e.to_string()))?;
        config.target()?;
        Ok(config)
    }

    /// Load from `path`, which must exist.
    pub fn load_from(path: &Path) -> UqlResult<Self> {
        debug!(path = %path.display(), "loading config");
        let content = fs::read_to_string(path)
            .map_err(|e| UqlError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Load from `explicit` if given, else the first file found in the
    /// default locations, else defaults.
    pub fn load(explicit: Option<&Path>) -> UqlResult<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match Self::default_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("uql").join("config.toml"));
        }
        paths
    }

    pub fn target(&self) -> UqlResult<Target> {
        self.default_target
            .parse()
            .map_err(|e: UqlError| UqlError::Config(format!("default_target: {e}")))
    }

    pub fn translate_options(&self) -> TranslateOptions {
        TranslateOptions {
            parameterized: self.parameterized,
            allow_filtering: self.allow_filtering,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml("default_target = \"cassandra\"\n").unwrap();
        assert_eq!(config.target().unwrap(), Target::Cassandra);
        assert!(config.pretty);
        assert!(!config.parameterized);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_target_is_a_config_error() {
        let err = Config::from_toml("default_target = \"dynamo\"").unwrap_err();
        assert!(matches!(err, UqlError::Config(_)));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = Config::from_toml("colour = true").unwrap_err();
        assert!(matches!(err, UqlError::Config(_)));
    }

    #[test]
    fn test_options_mapping() {
        let config = Config::from_toml("parameterized = true\nallow_filtering = true").unwrap();
        assert_eq!(
            config.translate_options(),
            TranslateOptions {
                parameterized: true,
                allow_filtering: true,
            }
        );
    }

    #[test]
    fn test_missing_explicit_path_fails() {
        let err = Config::load(Some(Path::new("/nonexistent/uql.toml"))).unwrap_err();
        assert!(matches!(err, UqlError::Config(_)));
    }
}
