//! Configuration loading and data folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable overriding the data folder
pub const DATA_FOLDER_ENV: &str = "FARMOPTIMA_DATA_FOLDER";

/// Application folder name under the platform config/data directories
const APP_DIR: &str = "farmoptima";

/// Default hosted model for farm analysis
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-2.5-flash";

/// Default text-generation API base URL
pub const DEFAULT_ANALYSIS_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// TOML configuration file contents
///
/// Every field is optional; a missing file behaves like an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the persisted slots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_folder: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Analysis gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_model() -> String {
    DEFAULT_ANALYSIS_MODEL.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ANALYSIS_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Platform config file location: `<config_dir>/farmoptima/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Read and parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load configuration, degrading to defaults
///
/// A missing file is normal (debug log). An unreadable or invalid file logs
/// a warning. Neither stops startup.
pub fn load_toml_config(path: Option<&Path>) -> TomlConfig {
    let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
        debug!("No config directory on this platform, using defaults");
        return TomlConfig::default();
    };

    if !path.exists() {
        debug!("Config file {} not found, using defaults", path.display());
        return TomlConfig::default();
    }

    match read_toml_config(&path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{}; using defaults", e);
            TomlConfig::default()
        }
    }
}

/// Write config atomically (temp file + rename)
///
/// On Unix the file is restricted to 0600 since it may hold an API key.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize config failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    std::fs::write(&temp, content)?;

    if let Err(e) = restrict_and_rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(())
}

fn restrict_and_rename(temp: &Path, path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(temp, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(temp, path)
}

/// Data folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. `FARMOPTIMA_DATA_FOLDER` environment variable
/// 3. TOML `data_folder`
/// 4. OS-dependent default
pub fn resolve_data_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.data_folder {
        return path.clone();
    }

    default_data_folder()
}

/// `<data_local_dir>/farmoptima`, or `./farmoptima_data` when the platform
/// has no data directory
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./farmoptima_data"))
}
