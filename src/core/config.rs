//! Configuration management for the translation service.
//!
//! Settings are read once at startup from the process environment (after an
//! optional `.env` file has been loaded by the binary). The provider credential
//! is optional here: a missing key only surfaces when the model is called.

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server configuration (host, port)
    pub server: ServerConfig,

    /// Chat-completion provider configuration
    pub provider: ProviderConfig,

    /// Whether to verify SSL certificates for upstream requests
    pub verify_ssl: bool,

    /// Optional upstream request timeout; the HTTP client default applies when unset
    pub request_timeout_secs: Option<u64>,
}

/// Configuration for the chat-completion provider.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Base URL for the provider's API (without `/chat/completions`)
    pub api_base: String,

    /// API key for authentication
    pub api_key: Option<String>,

    /// Model identifier sent with every request
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

/// Server-specific configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Flat view of the environment variables the service understands.
///
/// The `config` crate lowercases variable names, so `OPENAI_API_KEY`
/// arrives as `openai_api_key`.
#[derive(Debug, Deserialize)]
struct EnvSettings {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    openai_api_key: Option<String>,
    #[serde(default = "default_api_base")]
    openai_api_base: String,
    #[serde(default = "default_model")]
    openai_model: String,
    #[serde(default = "default_temperature")]
    temperature: f32,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
    #[serde(default = "default_verify_ssl")]
    verify_ssl: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

// Low temperature keeps translations consistent between calls.
fn default_temperature() -> f32 {
    0.2
}

fn default_verify_ssl() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use machine_translator::core::config::AppConfig;
    ///
    /// let config = AppConfig::from_env().expect("Failed to load config");
    /// println!("listening on {}", config.bind_address());
    /// ```
    pub fn from_env() -> Result<Self> {
        Self::from_environment(Environment::default())
    }

    /// Load configuration from an explicit `config` environment source.
    pub fn from_environment(environment: Environment) -> Result<Self> {
        let settings: EnvSettings = Config::builder()
            .add_source(environment)
            .build()
            .context("Failed to read environment configuration")?
            .try_deserialize()
            .context("Failed to parse environment configuration")?;

        Ok(settings.into())
    }

    /// `host:port` string for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl From<EnvSettings> for AppConfig {
    fn from(settings: EnvSettings) -> Self {
        let api_key = settings
            .openai_api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Self {
            server: ServerConfig {
                host: settings.host,
                port: settings.port,
            },
            provider: ProviderConfig {
                api_base: settings.openai_api_base.trim_end_matches('/').to_string(),
                api_key,
                model: settings.openai_model,
                temperature: settings.temperature,
            },
            verify_ssl: settings.verify_ssl,
            request_timeout_secs: settings.request_timeout_secs,
        }
    }
}
