//! Configuration for hotjar-mcp.
//!
//! Layered resolution: tool-call parameters override process configuration,
//! which is environment variables layered over an optional TOML file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::requests::Credentials;
use crate::ServerResult;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "hotjar-mcp.toml";

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General settings (logging, port, transport).
    #[serde(default)]
    pub general: GeneralConfig,

    /// Hotjar API settings and process-wide defaults.
    #[serde(default)]
    pub hotjar: HotjarConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Port for the SSE transport.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Transport mode (sse, stdio).
    #[serde(default)]
    pub transport: TransportMode,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            port: default_port(),
            transport: TransportMode::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_port() -> u16 {
    3001
}

/// Available transports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// SSE over HTTP (default).
    #[default]
    Sse,
    /// Newline-delimited JSON over stdin/stdout.
    Stdio,
}

/// Hotjar API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotjarConfig {
    /// Default client ID (HOTJAR_CLIENT_ID).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Default client secret (HOTJAR_CLIENT_SECRET).
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Default site ID (HOTJAR_SITE_ID).
    #[serde(default)]
    pub site_id: Option<String>,

    /// Default survey ID (HOTJAR_SURVEY_ID).
    #[serde(default)]
    pub survey_id: Option<String>,

    /// API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Fixed page size for list operations.
    #[serde(default = "default_api_limit")]
    pub api_limit: u32,
}

impl Default for HotjarConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            site_id: None,
            survey_id: None,
            api_base: default_api_base(),
            api_limit: default_api_limit(),
        }
    }
}

impl HotjarConfig {
    /// Process-wide default credentials.
    pub fn default_credentials(&self) -> Credentials {
        Credentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.hotjar.io/v1".to_string()
}

fn default_api_limit() -> u32 {
    100
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> ServerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ServerResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Tries to load configuration from the current directory, falling back
    /// to defaults, then applies environment overrides.
    pub fn load_or_default() -> Self {
        Self::load(CONFIG_FILE)
            .unwrap_or_default()
            .with_env_overrides()
    }

    /// Applies environment variable overrides on top of the file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(port) = env_var("PORT").and_then(|v| v.parse().ok()) {
            self.general.port = port;
        }
        if let Some(level) = env_var("LOG_LEVEL") {
            self.general.log_level = level;
        }
        if let Some(transport) = env_var("MCP_TRANSPORT") {
            if transport.eq_ignore_ascii_case("stdio") {
                self.general.transport = TransportMode::Stdio;
            }
        }
        if let Some(id) = env_var("HOTJAR_CLIENT_ID") {
            self.hotjar.client_id = Some(id);
        }
        if let Some(secret) = env_var("HOTJAR_CLIENT_SECRET") {
            self.hotjar.client_secret = Some(secret);
        }
        if let Some(site) = env_var("HOTJAR_SITE_ID") {
            self.hotjar.site_id = Some(site);
        }
        if let Some(survey) = env_var("HOTJAR_SURVEY_ID") {
            self.hotjar.survey_id = Some(survey);
        }
        self
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.general.port, 3001);
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.transport, TransportMode::Sse);
        assert_eq!(config.hotjar.api_base, "https://api.hotjar.io/v1");
        assert_eq!(config.hotjar.api_limit, 100);
        assert!(config.hotjar.client_id.is_none());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = Config::default();
        config.hotjar.site_id = Some("12345".to_string());
        config.general.transport = TransportMode::Stdio;

        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.hotjar.site_id.as_deref(), Some("12345"));
        assert_eq!(parsed.general.transport, TransportMode::Stdio);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: Config = toml::from_str("[hotjar]\nsite_id = \"99\"\n").unwrap();
        assert_eq!(parsed.hotjar.site_id.as_deref(), Some("99"));
        assert_eq!(parsed.hotjar.api_limit, 100);
        assert_eq!(parsed.general.port, 3001);
    }

    #[test]
    fn test_default_credentials_from_config() {
        let mut config = Config::default();
        config.hotjar.client_id = Some("env-id".to_string());
        config.hotjar.client_secret = Some("env-secret".to_string());

        let creds = config.hotjar.default_credentials();
        assert!(creds.is_complete());
        assert_eq!(creds.cache_key(), Some("env-id"));
    }

    // Testes de env ficam num único caso: o harness roda testes em paralelo
    // e variáveis de ambiente são estado compartilhado do processo.
    #[test]
    fn test_env_overrides() {
        std::env::set_var("HOTJAR_SITE_ID", "777");
        std::env::set_var("PORT", "4010");
        std::env::set_var("MCP_TRANSPORT", "stdio");

        let config = Config::default().with_env_overrides();
        assert_eq!(config.hotjar.site_id.as_deref(), Some("777"));
        assert_eq!(config.general.port, 4010);
        assert_eq!(config.general.transport, TransportMode::Stdio);

        std::env::remove_var("HOTJAR_SITE_ID");
        std::env::remove_var("PORT");
        std::env::remove_var("MCP_TRANSPORT");
    }
}
