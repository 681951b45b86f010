//! Configuration module for roleguard.

use serde::Deserialize;
use std::path::Path;

use crate::auth::SigningSecret;
use crate::{Result, RoleguardError};

/// Environment variable that overrides `auth.jwt_secret`.
pub const JWT_SECRET_ENV: &str = "ROLEGUARD_JWT_SECRET";

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7002
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/roleguard.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/roleguard.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Credential and token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens (must be set).
    #[serde(default)]
    pub jwt_secret: SigningSecret,
    /// Session token lifetime in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_hash_memory")]
    pub hash_memory_kib: u32,
    /// Argon2 time cost (iterations).
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    /// Argon2 parallelism (lanes).
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
}

fn default_token_ttl() -> u64 {
    3600 // 1 hour
}

fn default_hash_memory() -> u32 {
    65536 // 64 MB
}

fn default_hash_iterations() -> u32 {
    3
}

fn default_hash_parallelism() -> u32 {
    4
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SigningSecret::default(),
            token_ttl_secs: default_token_ttl(),
            hash_memory_kib: default_hash_memory(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
        }
    }
}

/// HTTP surface configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Requests allowed per client IP within one rate-limit window.
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,
    /// Rate-limit window length in seconds.
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,
    /// Key the rate limiter on `X-Forwarded-For`/`X-Real-IP` instead of the
    /// peer address. Only enable behind a proxy that sets these headers.
    #[serde(default)]
    pub trust_proxy: bool,
}

fn default_rate_limit_max() -> u32 {
    100
}

fn default_rate_limit_window() -> u64 {
    900 // 15 minutes
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            rate_limit_max: default_rate_limit_max(),
            rate_limit_window_secs: default_rate_limit_window(),
            trust_proxy: false,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Credential and token configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// HTTP surface configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(RoleguardError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RoleguardError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `ROLEGUARD_JWT_SECRET`: Override the token signing secret
    pub fn apply_env_overrides(&mut self) {
        if let Ok(jwt_secret) = std::env::var(JWT_SECRET_ENV) {
            if !jwt_secret.is_empty() {
                self.auth.jwt_secret = SigningSecret::new(jwt_secret);
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the signing secret is not set
    /// - the token lifetime is zero
    /// - the Argon2 work factor is rejected by the hasher
    /// - the rate limit allows no requests or has an empty window
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(RoleguardError::Config(format!(
                "jwt_secret is not set. Set it in config.toml or via the {JWT_SECRET_ENV} environment variable."
            )));
        }
        if self.auth.token_ttl_secs == 0 {
            return Err(RoleguardError::Config(
                "token_ttl_secs must be greater than zero".to_string(),
            ));
        }
        crate::auth::PasswordHasher::new(&self.auth)
            .map_err(|e| RoleguardError::Config(e.to_string()))?;
        if self.web.rate_limit_max == 0 || self.web.rate_limit_window_secs == 0 {
            return Err(RoleguardError::Config(
                "rate_limit_max and rate_limit_window_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
