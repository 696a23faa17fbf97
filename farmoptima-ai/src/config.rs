//! API key and gateway settings resolution
//!
//! Provides multi-tier API key resolution with ENV → TOML priority.

use farmoptima_common::config::AnalysisConfig;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::AnalysisError;

/// Primary environment variable for the analysis API key
pub const API_KEY_ENV: &str = "FARMOPTIMA_API_KEY";

/// Provider-standard environment variable, checked second
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Everything the client needs to reach the hosted model
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl GatewaySettings {
    /// Settings from config with the API key resolved from all sources
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        Ok(Self {
            api_key: resolve_api_key(config)?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

/// Resolve the API key
///
/// **Priority:** `FARMOPTIMA_API_KEY` → `GEMINI_API_KEY` → TOML `[analysis] api_key`
pub fn resolve_api_key(config: &AnalysisConfig) -> Result<String, AnalysisError> {
    let candidates = [
        ("environment", std::env::var(API_KEY_ENV).ok()),
        ("environment", std::env::var(GEMINI_API_KEY_ENV).ok()),
        ("TOML", config.api_key.clone()),
    ];

    let mut valid = candidates
        .into_iter()
        .filter_map(|(source, key)| key.filter(|k| is_valid_key(k)).map(|k| (source, k)));

    let Some((source, key)) = valid.next() else {
        return Err(AnalysisError::MissingApiKey);
    };

    // Warn if multiple sources (potential misconfiguration)
    if valid.next().is_some() {
        warn!("Analysis API key found in multiple sources. Using {} (highest priority).", source);
    }

    info!("Analysis API key loaded from {}", source);
    Ok(key.trim().to_string())
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var(API_KEY_ENV);
        std::env::remove_var(GEMINI_API_KEY_ENV);
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("  \t"));
    }

    #[test]
    #[serial]
    fn test_missing_everywhere() {
        clear_env();
        let result = resolve_api_key(&AnalysisConfig::default());
        assert!(matches!(result, Err(AnalysisError::MissingApiKey)));
    }

    #[test]
    #[serial]
    fn test_toml_key_used_when_env_unset() {
        clear_env();
        let config = AnalysisConfig {
            api_key: Some(" toml-key ".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&config).unwrap(), "toml-key");
    }

    #[test]
    #[serial]
    fn test_env_beats_toml_and_blank_env_is_ignored() {
        clear_env();
        let config = AnalysisConfig {
            api_key: Some("toml-key".to_string()),
            ..Default::default()
        };

        std::env::set_var(API_KEY_ENV, "   ");
        std::env::set_var(GEMINI_API_KEY_ENV, "gemini-key");
        assert_eq!(resolve_api_key(&config).unwrap(), "gemini-key");

        std::env::set_var(API_KEY_ENV, "primary-key");
        assert_eq!(resolve_api_key(&config).unwrap(), "primary-key");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_settings_from_config() {
        clear_env();
        let config = AnalysisConfig {
            api_key: Some("k".to_string()),
            endpoint: "http://localhost:9999/v1beta/".to_string(),
            timeout_secs: 5,
            ..Default::default()
        };

        let settings = GatewaySettings::from_config(&config).unwrap();
        assert_eq!(settings.endpoint, "http://localhost:9999/v1beta");
        assert_eq!(settings.model, "gemini-2.5-flash");
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }
}
