//! Configuration module for Content Judge.
//!
//! Loads configuration from YAML files and environment variables.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::{AUTO_FAIL_THRESHOLD, AUTO_PASS_THRESHOLD};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub judge: JudgeConfig,
    #[serde(default)]
    pub triage: TriageConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Judge model configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// API key; falls back to `ANTHROPIC_API_KEY` when empty.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Messages endpoint.
    pub api_url: String,
    /// Response length cap.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Triage thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Overall score at or above which content passes automatically.
    pub auto_pass_threshold: f64,
    /// Overall score below which content fails automatically.
    pub auto_fail_threshold: f64,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (CONTENT_JUDGE__*)
    /// 2. config/local.yaml (if exists)
    /// 3. config/default.yaml (if exists)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            // Start with default config
            .add_source(File::with_name("config/default").required(false))
            // Layer on local overrides
            .add_source(File::with_name("config/local").required(false))
            // Layer on environment variables with CONTENT_JUDGE prefix
            .add_source(
                Environment::with_prefix("CONTENT_JUDGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = config.try_deserialize()?;
        config.judge.apply_env_fallback(std::env::var("ANTHROPIC_API_KEY").ok());
        Ok(config)
    }
}

impl JudgeConfig {
    fn apply_env_fallback(&mut self, env_key: Option<String>) {
        if self.api_key.trim().is_empty() {
            if let Some(key) = env_key {
                self.api_key = key;
            }
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_url: "https://api.anthropic.com/v1/messages".to_string(),
            max_tokens: 2000,
            timeout_secs: 60,
        }
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            auto_pass_threshold: AUTO_PASS_THRESHOLD,
            auto_fail_threshold: AUTO_FAIL_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_judge_config() {
        let config = JudgeConfig::default();
        assert_eq!(config.model, "claude-sonnet-4-20250514");
        assert_eq!(config.max_tokens, 2000);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_default_triage_config() {
        let config = TriageConfig::default();
        assert_eq!(config.auto_pass_threshold, 4.0);
        assert_eq!(config.auto_fail_threshold, 2.5);
    }

    #[test]
    fn test_api_key_env_fallback() {
        let mut config = JudgeConfig::default();
        config.apply_env_fallback(Some("sk-from-env".to_string()));
        assert_eq!(config.api_key, "sk-from-env");

        let mut configured = JudgeConfig {
            api_key: "sk-from-file".to_string(),
            ..JudgeConfig::default()
        };
        configured.apply_env_fallback(Some("sk-from-env".to_string()));
        assert_eq!(configured.api_key, "sk-from-file");
    }

    #[test]
    fn test_partial_sections_use_defaults() {
        let config: Config = ConfigLoader::builder()
            .set_override("judge.model", "claude-3-haiku-20240307")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.judge.model, "claude-3-haiku-20240307");
        assert_eq!(config.judge.max_tokens, 2000);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.triage.auto_fail_threshold, 2.5);
    }
}
