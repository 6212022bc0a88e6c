//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Backend
//! - `STORE_BACKEND` - `rest` (default) or `memory` (local development)
//! - `BACKEND_URL` - Hosted backend project URL (required for `rest`)
//! - `BACKEND_API_KEY` - Hosted backend API key (required for `rest`)
//! - `BACKEND_TIMEOUT_SECS` - HTTP timeout for backend calls (default: 10)
//! - `DEV_ADMIN_USERNAME` / `DEV_ADMIN_PASSWORD` - Login for the `memory` backend
//!
//! ## Server
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL (default: `http://localhost:3001`)
//! - `SESSION_IDLE_MINUTES` - Session inactivity expiry (default: 60)
//! - `SESSION_MAX_HOURS` - Absolute session lifetime (default: 12)
//! - `CONTENT_CACHE_TTL_SECS` - Public content cache TTL (default: 60)
//!
//! ## Observability
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`,
//!   `SENTRY_TRACES_SAMPLE_RATE` - Sentry error tracking
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_DEV_USERNAME: &str = "admin";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
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

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin API
    pub base_url: String,
    /// Where content and credentials live
    pub backend: BackendConfig,
    /// Session lifetimes
    pub session: SessionConfig,
    /// Time-to-live of the cached public landing payload
    pub content_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
}

/// Content store selection.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Hosted REST backend.
    Rest(RestBackendConfig),
    /// In-process store for local development. Content is lost on restart.
    Memory(MemoryBackendConfig),
}

/// Hosted REST backend configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct RestBackendConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: Url,
    /// API key sent as `apikey` and bearer token
    pub api_key: SecretString,
    /// Request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for RestBackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBackendConfig")
            .field("url", &self.url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Development login for the in-memory backend.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct MemoryBackendConfig {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for MemoryBackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackendConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Session lifetimes.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Session expires after this much inactivity.
    pub idle_timeout: Duration,
    /// Session expires this long after login regardless of activity.
    pub max_lifetime: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(60 * 60),
            max_lifetime: Duration::from_secs(12 * 60 * 60),
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = parse_env_or_default("ADMIN_PORT", 3001_u16)?;
        let base_url = get_env_or_default("ADMIN_BASE_URL", "http://localhost:3001");

        let backend = BackendConfig::from_env()?;
        let session = SessionConfig::from_env()?;
        let content_cache_ttl =
            Duration::from_secs(parse_env_or_default("CONTENT_CACHE_TTL_SECS", 60_u64)?);

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let json_logs = get_optional_env("LOG_FORMAT").is_some_and(|v| v == "json");

        Ok(Self {
            host,
            port,
            base_url,
            backend,
            session,
            content_cache_ttl,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            json_logs,
        })
    }

    /// Configuration for running against the in-memory backend.
    #[must_use]
    pub fn for_memory_backend(username: &str, password: &str) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            backend: BackendConfig::Memory(MemoryBackendConfig {
                username: username.to_string(),
                password: SecretString::from(password),
            }),
            session: SessionConfig::default(),
            content_cache_ttl: Duration::from_secs(60),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
            json_logs: false,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl BackendConfig {
    /// Load the backend selection from environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the selected backend is misconfigured.
    pub fn from_env() -> Result<Self, ConfigError> {
        match get_env_or_default("STORE_BACKEND", "rest").as_str() {
            "rest" => Ok(Self::Rest(RestBackendConfig::from_env()?)),
            "memory" => Ok(Self::Memory(MemoryBackendConfig::from_env()?)),
            other => Err(ConfigError::InvalidEnvVar(
                "STORE_BACKEND".to_string(),
                format!("expected 'rest' or 'memory', got '{other}'"),
            )),
        }
    }
}

impl RestBackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_required_env("BACKEND_URL")?;
        let url = parse_backend_url(&raw_url)?;
        let api_key = get_validated_secret("BACKEND_API_KEY")?;
        let timeout = Duration::from_secs(parse_env_or_default("BACKEND_TIMEOUT_SECS", 10_u64)?);

        Ok(Self {
            url,
            api_key,
            timeout,
        })
    }
}

impl MemoryBackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let username = get_env_or_default("DEV_ADMIN_USERNAME", DEFAULT_DEV_USERNAME);
        let password = get_required_env("DEV_ADMIN_PASSWORD")?;
        if password.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "DEV_ADMIN_PASSWORD".to_string(),
                "must not be blank".to_string(),
            ));
        }
        Ok(Self {
            username,
            password: SecretString::from(password),
        })
    }
}

impl SessionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let idle_minutes = parse_env_or_default("SESSION_IDLE_MINUTES", 60_u64)?;
        let max_hours = parse_env_or_default("SESSION_MAX_HOURS", 12_u64)?;
        if idle_minutes == 0 || max_hours == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SESSION_*".to_string(),
                "session lifetimes must be positive".to_string(),
            ));
        }

        Ok(Self {
            idle_timeout: Duration::from_secs(idle_minutes * 60),
            max_lifetime: Duration::from_secs(max_hours * 60 * 60),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse the backend project URL. Must be absolute http(s).
fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "BACKEND_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
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

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
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
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the backend."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.q7Zk", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_backend_url() {
        assert!(parse_backend_url("https://abc.supabase.co").is_ok());
        assert!(parse_backend_url("ftp://abc.supabase.co").is_err());
        assert!(parse_backend_url("not a url").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = AdminConfig::for_memory_backend("admin", "hunter2");
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_rest_backend_config_debug_redacts_secrets() {
        let config = RestBackendConfig {
            url: Url::parse("https://abc.supabase.co").unwrap(),
            api_key: SecretString::from("super_secret_backend_key"),
            timeout: Duration::from_secs(10),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("abc.supabase.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_backend_key"));
    }

    #[test]
    fn test_memory_backend_config_debug_redacts_password() {
        let config = MemoryBackendConfig {
            username: "admin".to_string(),
            password: SecretString::from("correct-horse"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("admin"));
        assert!(!debug_output.contains("correct-horse"));
    }

    #[test]
    fn test_default_session_lifetimes() {
        let session = SessionConfig::default();
        assert!(session.idle_timeout < session.max_lifetime);
    }
}
