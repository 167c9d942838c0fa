//! Configuration loading for trek.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.trek/config.toml`)
//! 3. User config (`~/.trek/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The system runs with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FailOpen, Result, TrekError};

/// Main configuration struct for trek.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Catalog source configuration.
    pub catalog: CatalogConfig,
    /// Admin capability configuration.
    pub admin: AdminConfig,
}

/// Catalog source configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to the catalog JSON file. When unset, `<trek_home>/catalog.json`
    /// is used.
    pub path: Option<PathBuf>,
}

/// Admin capability configuration.
///
/// The unlock override grants access to every level without touching
/// persisted progress; it sits outside the progress document entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Treat every level as unlocked for this process.
    pub unlock_override: bool,
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.trek/config.toml` in cwd)
    /// 3. User config (`~/.trek/config.toml`)
    /// 4. Defaults
    pub fn load() -> Self {
        // Fail-open: if cwd is unavailable, skip the project layer rather
        // than doing path operations against an empty PathBuf
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.trek/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = trek_home()?;
        let config_path = home.join("config.toml");
        Self::load_from_file(&config_path).ok()
    }

    /// Load project config from `.trek/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let config_path = cwd.join(".trek").join("config.toml");
        Self::load_from_file(&config_path).ok()
    }

    /// Load config from a specific file path.
    fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| TrekError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| TrekError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // TREK_CATALOG
        if let Ok(val) = env::var("TREK_CATALOG") {
            if val.is_empty() {
                eprintln!("Warning: TREK_CATALOG is empty. Ignoring.");
            } else {
                self.catalog.path = Some(PathBuf::from(val));
            }
        }

        // TREK_ADMIN
        if let Ok(val) = env::var("TREK_ADMIN") {
            match val.as_str() {
                "true" | "1" => self.admin.unlock_override = true,
                "false" | "0" => self.admin.unlock_override = false,
                _ => eprintln!(
                    "Warning: Invalid TREK_ADMIN value '{}'. \
                    Expected 'true', 'false', '1' or '0'. Using default '{}'.",
                    val, self.admin.unlock_override
                ),
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// The `other` config takes precedence; non-default fields from `other`
    /// replace the corresponding fields of `self`. A layer cannot set a
    /// field back to its default to mask a lower layer, which keeps layering
    /// purely additive.
    fn merge(mut self, other: Config) -> Self {
        if other.catalog.path.is_some() {
            self.catalog.path = other.catalog.path;
        }
        if other.admin.unlock_override {
            self.admin.unlock_override = true;
        }
        self
    }

    /// Load config with fail-open behavior.
    ///
    /// If loading fails for any reason, returns defaults.
    pub fn load_fail_open() -> Self {
        let result: Result<Self> = Ok(Self::load());
        result.fail_open_default("loading config")
    }

    /// Resolve the catalog file path: configured path, else
    /// `<trek_home>/catalog.json`.
    pub fn catalog_path(&self) -> Option<PathBuf> {
        match &self.catalog.path {
            Some(path) => Some(path.clone()),
            None => trek_home().map(|h| h.join("catalog.json")),
        }
    }
}

/// Get the trek home directory.
///
/// Checks the `TREK_HOME` environment variable first, then falls back to
/// `~/.trek`.
///
/// If `TREK_HOME` is set it must be non-empty; relative paths are
/// canonicalized when possible. Invalid values fall back to the default.
pub fn trek_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("TREK_HOME") {
        if home.is_empty() {
            tracing::warn!("TREK_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("TREK_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".trek"));
    }

    // Fallback for containerized/minimal environments without HOME
    let fallback_path = fallback_trek_home();
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

/// Get fallback trek home path when HOME is unavailable.
#[cfg(unix)]
fn fallback_trek_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    PathBuf::from(format!("/tmp/trek-{}", uid))
}

/// Get fallback trek home path when HOME is unavailable.
#[cfg(not(unix))]
fn fallback_trek_home() -> PathBuf {
    std::env::temp_dir().join("trek")
}

/// Get the crash log path.
///
/// Returns `<trek_home>/crash.log`.
pub fn crash_log_path() -> Option<PathBuf> {
    trek_home().map(|h| h.join("crash.log"))
}
