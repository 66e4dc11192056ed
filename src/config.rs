//! Configuration loading and constants.
//!
//! Loads application configuration from a TOML file and defines the defaults
//! for the HTTP listener, the webhook (secret, status file, diagnostic log,
//! time zone) and process logging. `AppConfig` is the root configuration struct.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use const_format::formatcp;
use serde::Deserialize;

// =============================================================================
// HTTP Response Cache Control
// =============================================================================

/// Webhook responses reflect a single write and must never be replayed by a cache
pub const CACHE_CONTROL_WEBHOOK: &str = "no-store";

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default route the automation service posts to
pub const DEFAULT_WEBHOOK_PATH: &str = "/";

/// Response header echoing the request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Liveness check route
pub const HEALTH_PATH: &str = "/health";

/// Default status file, relative to the working directory
pub const DEFAULT_STATUS_FILE: &str = "status.txt";

/// Extension given to the executable path to derive the diagnostic log path
pub const DIAGNOSTIC_LOG_EXTENSION: &str = "log";

/// Fallback diagnostic log when the executable path cannot be resolved
pub const FALLBACK_DIAGNOSTIC_LOG: &str = formatcp!("{}.{}", CRATE_NAME, DIAGNOSTIC_LOG_EXTENSION);

/// Zone used to render diagnostic log timestamps
pub const DEFAULT_TIMEZONE: &str = "Europe/Berlin";

/// Timestamp layout of diagnostic log lines
pub const DIAGNOSTIC_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CRATE_NAME: &str = env!("CARGO_CRATE_NAME");

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = formatcp!("{}=debug,tower_http=debug", CRATE_NAME);

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    pub http: HttpServerConfig,
    /// Secret, status file and diagnostic log settings
    pub webhook: WebhookConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    /// Route that accepts status updates (default: "/")
    #[serde(default = "HttpServerConfig::default_path")]
    pub path: String,
}

impl HttpServerConfig {
    fn default_path() -> String {
        DEFAULT_WEBHOOK_PATH.to_string()
    }
}

/// Webhook configuration
#[derive(Clone, Deserialize)]
pub struct WebhookConfig {
    /// Token that must appear somewhere in every accepted request body
    pub secret: String,
    /// File holding the last accepted body (default: "status.txt")
    #[serde(default = "WebhookConfig::default_status_file")]
    pub status_file: PathBuf,
    /// Diagnostic log (default: the executable path with a `.log` extension)
    pub log_file: Option<PathBuf>,
    /// IANA zone for diagnostic timestamps (default: "Europe/Berlin")
    #[serde(default = "WebhookConfig::default_timezone")]
    pub timezone: String,
}

// Hand-written so the secret never reaches the process logs.
impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("secret", &"<redacted>")
            .field("status_file", &self.status_file)
            .field("log_file", &self.log_file)
            .field("timezone", &self.timezone)
            .finish()
    }
}

impl WebhookConfig {
    fn default_status_file() -> PathBuf {
        PathBuf::from(DEFAULT_STATUS_FILE)
    }

    fn default_timezone() -> String {
        DEFAULT_TIMEZONE.to_string()
    }

    /// Get the effective diagnostic log path (configured or derived from the executable)
    pub fn log_file(&self) -> PathBuf {
        match &self.log_file {
            Some(path) => path.clone(),
            None => std::env::current_exe()
                .map(|exe| exe.with_extension(DIAGNOSTIC_LOG_EXTENSION))
                .unwrap_or_else(|_| PathBuf::from(FALLBACK_DIAGNOSTIC_LOG)),
        }
    }

    /// Parse the configured time zone
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::Validation(format!("Unknown time zone: {}", self.timezone)))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.webhook.secret.is_empty() {
            return Err(ConfigError::Validation(
                "webhook.secret must not be empty".to_string(),
            ));
        }

        self.webhook.tz()?;

        if !self.http.path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "http.path must start with '/': {}",
                self.http.path
            )));
        }

        if self.http.path == HEALTH_PATH {
            return Err(ConfigError::Validation(format!(
                "http.path must not be {}",
                HEALTH_PATH
            )));
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(ConfigError::Validation(format!(
                "logging.format must be \"text\" or \"json\": {}",
                self.logging.format
            )));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
