//! Configuration loading and typed config structures for the SafeSpace
//! backend.
//!
//! The canonical configuration lives in `safespace-config.yaml` at the
//! project root. Every section and field has a default, so a missing file
//! or a partial file both yield a runnable development setup.

use std::path::{Path, PathBuf};

use safespace_api::auth::{DEFAULT_BCRYPT_COST, DEFAULT_TOKEN_TTL_HOURS};
use safespace_live::DEFAULT_CAPACITY;
use serde::Deserialize;

/// Work factors bcrypt accepts.
pub const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Signing secret used when none is configured. Fine for development only.
pub const DEVELOPMENT_JWT_SECRET: &str = "safespace-development-secret";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held an unusable value.
    #[error("invalid value for {name}: {value}")]
    Env {
        /// Variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A setting parsed but cannot be used.
    #[error("invalid {field}: {message}")]
    Invalid {
        /// Dotted path of the setting.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration. Mirrors the structure of
/// `safespace-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SafeSpaceConfig {
    /// HTTP listener.
    #[serde(default)]
    pub server: ServerSection,
    /// Persistence.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Password hashing and tokens.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Ward dataset and danger classification.
    #[serde(default)]
    pub safety: SafetyConfig,
    /// Heart-rate fan-out.
    #[serde(default)]
    pub live: LiveConfig,
    /// Request-handling policy.
    #[serde(default)]
    pub api: ApiConfig,
    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SafeSpaceConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides:
    ///
    /// - `DATABASE_URL` overrides `database.url`
    /// - `JWT_SECRET` overrides `auth.jwt_secret`
    /// - `PORT` overrides `server.port`
    /// - `SAFETY_DATASET_PATH` overrides `safety.dataset_path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML,
    /// [`ConfigError::Env`] if an override cannot be parsed, or
    /// [`ConfigError::Invalid`] if a setting is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML,
    /// [`ConfigError::Env`] if an override cannot be parsed, or
    /// [`ConfigError::Invalid`] if a setting is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail once requests arrive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `auth.bcrypt_cost` is outside
    /// [`BCRYPT_COST_RANGE`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !BCRYPT_COST_RANGE.contains(&self.auth.bcrypt_cost) {
            return Err(ConfigError::Invalid {
                field: "auth.bcrypt_cost",
                message: format!(
                    "{} is outside {}..={}",
                    self.auth.bcrypt_cost,
                    BCRYPT_COST_RANGE.start(),
                    BCRYPT_COST_RANGE.end()
                ),
            });
        }
        Ok(())
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if `PORT` is not a valid port number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if `PORT` is not a valid port number.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = val;
        }
        if let Some(val) = lookup("PORT") {
            self.server.port = val.trim().parse().map_err(|e| ConfigError::Env {
                name: "PORT",
                value: format!("{val} ({e})"),
            })?;
        }
        if let Some(val) = lookup("SAFETY_DATASET_PATH") {
            self.safety.dataset_path = PathBuf::from(val);
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` URL. Empty selects the in-memory store.
    #[serde(default)]
    pub url: String,
    /// Pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Whether a `PostgreSQL` URL is configured.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
        }
    }
}

/// Password hashing and token settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Token lifetime in hours.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u32,
    /// bcrypt work factor.
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    /// Whether the built-in development secret is still in use.
    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_JWT_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl_hours(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

/// Ward dataset and classification settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SafetyConfig {
    /// Path to the ward safety CSV.
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,
    /// Use the random simulation policy instead of the threshold rule.
    #[serde(default)]
    pub simulation_mode: bool,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            simulation_mode: false,
        }
    }
}

/// Heart-rate fan-out settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LiveConfig {
    /// Per-listener buffer size.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

/// Request-handling policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    /// Reject anonymous experience submissions.
    #[serde(default)]
    pub require_auth_for_experiences: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    10
}

fn default_jwt_secret() -> String {
    String::from(DEVELOPMENT_JWT_SECRET)
}

const fn default_token_ttl_hours() -> u32 {
    DEFAULT_TOKEN_TTL_HOURS
}

const fn default_bcrypt_cost() -> u32 {
    DEFAULT_BCRYPT_COST
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/Chennai_200_Wards_SafetyData.csv")
}

const fn default_broadcast_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_log_level() -> String {
    String::from("info")
}
