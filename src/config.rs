use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ConfigColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) offline: bool,
    pub(crate) compact: bool,
    pub(crate) debug: bool,
    /// `claude`, `codex` or `all`
    pub(crate) source: Option<String>,
    pub(crate) timezone: Option<String>,
    pub(crate) week_start: Option<String>,
    pub(crate) min_days_in_first_week: Option<u8>,
    pub(crate) claude_dirs: Vec<PathBuf>,
    pub(crate) codex_home: Option<PathBuf>,
    pub(crate) pricing_file: Option<PathBuf>,
    pub(crate) pricing_url: Option<String>,
    pub(crate) pricing_max_age_hours: Option<u64>,
    pub(crate) locale: Option<String>,
    pub(crate) color: Option<ConfigColorMode>,
}

/// Result of the config search. Logging is not up yet when the file is read,
/// so problems are collected and reported by the caller.
#[derive(Debug, Default)]
pub(crate) struct LoadedConfig {
    pub(crate) config: Config,
    pub(crate) path: Option<PathBuf>,
    pub(crate) warnings: Vec<ConfigError>,
}

impl Config {
    pub(crate) fn load() -> LoadedConfig {
        Self::load_from(&Self::config_paths())
    }

    /// First existing file that parses wins; broken files are skipped
    fn load_from(paths: &[PathBuf]) -> LoadedConfig {
        let mut loaded = LoadedConfig::default();

        for path in paths {
            if !path.is_file() {
                continue;
            }
            match Self::read(path) {
                Ok(config) => {
                    loaded.config = config;
                    loaded.path = Some(path.clone());
                    return loaded;
                }
                Err(e) => loaded.warnings.push(e),
            }
        }

        loaded
    }

    fn read(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str::<Config>(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/tokenbar/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("tokenbar").join("config.toml"));
        }

        // 2. Platform config dir (Application Support on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("tokenbar").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.tokenbar.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".tokenbar.toml"));
        }

        paths
    }
}
