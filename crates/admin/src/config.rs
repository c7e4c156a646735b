//! Admin client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `KIOSK_ADMIN_API_URL` - Base URL of the kiosk backend (e.g. `https://api.example.com/api`)
//!
//! ## Optional
//! - `KIOSK_ADMIN_API_TOKEN` - Bearer token for the admin endpoints
//! - `KIOSK_ADMIN_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 15)
//! - `KIOSK_ADMIN_REVALIDATE_INTERVAL_SECS` - Background revalidation period (default: 30)
//! - `KIOSK_ADMIN_DEDUPE_WINDOW_MS` - Window in which automatic revalidations share one request (default: 2000)
//! - `KIOSK_ADMIN_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)

use std::collections::HashMap;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_REVALIDATE_INTERVAL_SECS: u64 = 30;
const DEFAULT_DEDUPE_WINDOW_MS: u64 = 2000;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin client configuration.
#[derive(Clone)]
pub struct AdminConfig {
    /// Base URL of the kiosk backend; admin paths are appended to it
    pub api_url: Url,
    /// Bearer token for the admin endpoints
    pub api_token: Option<SecretString>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Background revalidation period
    pub revalidate_interval: Duration,
    /// Window in which automatic revalidations of one key share a request
    pub dedupe_window: Duration,
    /// Emit JSON logs instead of text
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout", &self.request_timeout)
            .field("revalidate_interval", &self.revalidate_interval)
            .field("dedupe_window", &self.dedupe_window)
            .field("log_json", &self.log_json)
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish_non_exhaustive()
    }
}

impl AdminConfig {
    /// Configuration with defaults for everything but the API URL.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            revalidate_interval: Duration::from_secs(DEFAULT_REVALIDATE_INTERVAL_SECS),
            dedupe_window: Duration::from_millis(DEFAULT_DEDUPE_WINDOW_MS),
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the API URL is missing or invalid, or a
    /// numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_required_env("KIOSK_ADMIN_API_URL")?)?;
        let api_token = get_optional_env("KIOSK_ADMIN_API_TOKEN").map(|token| {
            if let Err(e) = validate_secret_strength(&token, "KIOSK_ADMIN_API_TOKEN") {
                tracing::warn!("KIOSK_ADMIN_API_TOKEN validation warning: {e}");
            }
            SecretString::from(token)
        });

        let request_timeout = Duration::from_secs(get_u64_or_default(
            "KIOSK_ADMIN_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);
        let revalidate_interval = Duration::from_secs(get_u64_or_default(
            "KIOSK_ADMIN_REVALIDATE_INTERVAL_SECS",
            DEFAULT_REVALIDATE_INTERVAL_SECS,
        )?);
        let dedupe_window = Duration::from_millis(get_u64_or_default(
            "KIOSK_ADMIN_DEDUPE_WINDOW_MS",
            DEFAULT_DEDUPE_WINDOW_MS,
        )?);
        if revalidate_interval.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "KIOSK_ADMIN_REVALIDATE_INTERVAL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            api_url,
            api_token,
            request_timeout,
            revalidate_interval,
            dedupe_window,
            log_json: get_optional_env("KIOSK_ADMIN_LOG_JSON").is_some(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
        })
    }

    /// Replace the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(SecretString::from(token.into()));
        self
    }

    /// Returns the bearer token, if configured.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.api_token.as_ref().map(|t| t.expose_secret())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API base URL, accepting only http(s).
fn parse_api_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar("KIOSK_ADMIN_API_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "KIOSK_ADMIN_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get a numeric environment variable with a default value.
fn get_u64_or_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |value| {
        value
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // Token length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a token is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
