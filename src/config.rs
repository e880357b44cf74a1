//! Webhook configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). The three upstream credentials are
//! required; everything else has a default.

use std::net::SocketAddr;
use std::time::Duration;

/// Configuration loading failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// `LISTEN_ADDR` could not be parsed as a socket address.
    #[error("invalid LISTEN_ADDR: {0}")]
    InvalidListenAddr(#[from] std::net::AddrParseError),
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line output.
    Text,
    /// One JSON object per event.
    Json,
}

/// Top-level webhook configuration.
///
/// Loaded once at startup via [`WebhookConfig::from_env`].
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// API key for the image generation service.
    pub openai_api_key: String,

    /// Channel access token for the messaging platform.
    pub line_channel_access_token: String,

    /// Access token for the image host.
    pub gyazo_access_token: String,

    /// Base URL of the image generation API.
    pub openai_base_url: String,

    /// Base URL of the messaging platform API.
    pub line_api_base_url: String,

    /// Base URL of the image host's upload API.
    pub gyazo_upload_base_url: String,

    /// Image model identifier sent with every generation request.
    pub image_model: String,

    /// Timeout applied to every outbound HTTP call.
    pub http_timeout: Duration,

    /// Master switch for the persistence layer.
    pub persistence_enabled: bool,

    /// PostgreSQL connection string.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Log output format.
    pub log_format: LogFormat,
}

impl WebhookConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if a credential is absent and
    /// [`ConfigError::InvalidListenAddr`] if `LISTEN_ADDR` is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`WebhookConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr: SocketAddr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()?;

        let openai_api_key = required(&lookup, "OPENAI_API_KEY")?;
        let line_channel_access_token = required(&lookup, "LINE_CHANNEL_ACCESS_TOKEN")?;
        let gyazo_access_token = required(&lookup, "GYAZO_ACCESS_TOKEN")?;

        let openai_base_url = base_url(&lookup, "OPENAI_BASE_URL", "https://api.openai.com");
        let line_api_base_url = base_url(&lookup, "LINE_API_BASE_URL", "https://api.line.me");
        let gyazo_upload_base_url =
            base_url(&lookup, "GYAZO_UPLOAD_BASE_URL", "https://upload.gyazo.com");

        let image_model = lookup("IMAGE_MODEL").unwrap_or_else(|| "dall-e-3".to_string());
        let http_timeout = Duration::from_secs(parse_var(&lookup, "HTTP_TIMEOUT_SECS", 120));

        let persistence_enabled = parse_var_bool(&lookup, "PERSISTENCE_ENABLED", true);
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "postgres://localhost/imagegen".to_string());
        let database_max_connections = parse_var(&lookup, "DATABASE_MAX_CONNECTIONS", 5);

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            openai_api_key,
            line_channel_access_token,
            gyazo_access_token,
            openai_base_url,
            line_api_base_url,
            gyazo_upload_base_url,
            image_model,
            http_timeout,
            persistence_enabled,
            database_url,
            database_max_connections,
            log_format,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

/// Reads a base URL, stripping any trailing slash so paths can be appended.
fn base_url<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Parses a variable as `T`, returning `default` on missing or invalid values.
fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Parses a variable as a boolean. Accepts `"true"`, `"1"`, `"false"`,
/// `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_var_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.to_ascii_lowercase()).as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}
