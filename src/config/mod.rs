//! Configuration management for the gateway
//!
//! Loads configuration from environment variables with development-friendly
//! defaults. Compliance thresholds and rate-limit settings are consumed by
//! the request pipeline; everything else is server plumbing.

use std::env;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),
}

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse environment from string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Current environment
    pub environment: Environment,

    /// Server port
    pub port: u16,

    /// JWT signing secret (HS256)
    pub jwt_secret: String,

    /// Rate limit: request ceiling per client within the window
    pub rate_limit_requests: usize,

    /// Rate limit: trailing window duration in seconds
    pub rate_limit_window_secs: u64,

    /// Hard per-operation transaction amount ceiling
    pub max_transaction_amount: f64,

    /// Amount at which a transaction is flagged for manual review
    pub suspicious_activity_threshold: f64,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: u64,

    /// IP allow-list; empty disables the check
    pub ip_allowlist: Vec<String>,

    /// Start in maintenance mode (admins can toggle at runtime)
    pub maintenance_mode: bool,

    /// Audit service endpoint; events are logged locally when unset
    pub audit_sink_url: Option<String>,

    /// CORS allowed origins (comma-separated)
    pub cors_allowed_origins: Option<String>,

    /// Log level (RUST_LOG)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .map(|s| Environment::parse(&s))
            .unwrap_or(Ok(Environment::Development))?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8087".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("PORT must be a valid number".to_string()))?;

        // A default secret is acceptable for development only.
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ if environment.is_production() => {
                return Err(ConfigError::MissingEnvVar("JWT_SECRET".to_string()));
            }
            _ => "development-secret-change-in-production".to_string(),
        };

        let rate_limit_requests = parse_env("RATE_LIMIT_REQUESTS", 100usize);
        let rate_limit_window_secs = parse_env("RATE_LIMIT_WINDOW_SECS", 60u64);
        let max_transaction_amount = parse_env("MAX_TRANSACTION_AMOUNT", 1_000_000.0f64);
        let suspicious_activity_threshold =
            parse_env("SUSPICIOUS_ACTIVITY_THRESHOLD", 50_000.0f64);
        let max_body_bytes = parse_env("MAX_REQUEST_BODY_BYTES", 10 * 1024 * 1024u64);

        let ip_allowlist = env::var("IP_ALLOWLIST")
            .map(|s| split_list(&s))
            .unwrap_or_default();

        let maintenance_mode = parse_env("MAINTENANCE_MODE", false);

        let audit_sink_url = env::var("AUDIT_SERVICE_URL").ok().filter(|s| !s.is_empty());

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS").ok();

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        if suspicious_activity_threshold > max_transaction_amount {
            return Err(ConfigError::InvalidValue(
                "SUSPICIOUS_ACTIVITY_THRESHOLD must not exceed MAX_TRANSACTION_AMOUNT"
                    .to_string(),
            ));
        }

        Ok(Config {
            environment,
            port,
            jwt_secret,
            rate_limit_requests,
            rate_limit_window_secs,
            max_transaction_amount,
            suspicious_activity_threshold,
            max_body_bytes,
            ip_allowlist,
            maintenance_mode,
            audit_sink_url,
            cors_allowed_origins,
            log_level,
        })
    }

    /// Rate-limit window as a `Duration`
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Config {
            environment: Environment::Development,
            port: 8087,
            jwt_secret: "test-secret".to_string(),
            rate_limit_requests: 100,
            rate_limit_window_secs: 60,
            max_transaction_amount: 1_000_000.0,
            suspicious_activity_threshold: 50_000.0,
            max_body_bytes: 10 * 1024 * 1024,
            ip_allowlist: Vec::new(),
            maintenance_mode: false,
            audit_sink_url: None,
            cors_allowed_origins: None,
            log_level: "info".to_string(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}
