//! SafeSpace backend binary.
//!
//! Wires the ward dataset, danger classifier, heart-rate hub, storage and
//! auth into the API server and runs it until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `safespace-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load the ward safety dataset (fatal on any error or when empty)
//! 4. Build the danger classifier
//! 5. Select storage: `PostgreSQL` (with migrations) or in-memory
//! 6. Create the heart-rate hub and token issuer
//! 7. Serve until shutdown, then close the store

mod config;
mod error;

use std::path::Path;
use std::sync::Arc;

use safespace_api::{ApiSettings, AppState, PasswordHasher, ServerConfig, TokenIssuer};
use safespace_db::{PostgresConfig, PostgresPool, Store};
use safespace_live::HeartRateHub;
use safespace_safety::{ClassificationPolicy, DangerClassifier, SafetyDataset, SafetyError};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{DatabaseConfig, LoggingConfig, SafeSpaceConfig};
use crate::error::AppError;

/// Default configuration file, relative to the working directory.
const CONFIG_PATH: &str = "safespace-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any startup step fails or the server stops
/// abnormally.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load configuration. Logging is not up yet, so remember whether
    //    defaults were used and report it afterwards.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging)?;
    info!("safespace-server starting");
    if !from_file {
        info!(path = CONFIG_PATH, "Config file not found, using defaults");
    }
    if config.auth.uses_development_secret() {
        warn!("Using the built-in development JWT secret; set JWT_SECRET in production");
    }

    // 3. Load the ward dataset.
    let dataset = load_dataset(&config.safety.dataset_path)?;

    // 4. Build the classifier.
    let policy = if config.safety.simulation_mode {
        warn!("Danger checks use the random simulation policy; verdicts are not data-driven");
        ClassificationPolicy::Simulation
    } else {
        ClassificationPolicy::Threshold
    };
    let classifier = DangerClassifier::new(Arc::new(dataset), policy);
    info!(
        policy = policy.as_str(),
        wards = classifier.dataset().len(),
        "Danger classifier ready"
    );

    // 5. Select storage.
    let store = open_store(&config.database).await?;
    info!(backend = store.backend_name(), "Store ready");

    // 6. Hub, tokens, passwords.
    let hub = HeartRateHub::new(config.live.broadcast_capacity);
    let tokens = TokenIssuer::new(&config.auth.jwt_secret, config.auth.token_ttl_hours);
    let passwords = PasswordHasher::new(config.auth.bcrypt_cost);
    let settings = ApiSettings {
        require_auth_for_experiences: config.api.require_auth_for_experiences,
    };

    let state = Arc::new(AppState::new(
        store.clone(),
        classifier,
        hub,
        tokens,
        passwords,
        settings,
    ));

    // 7. Serve.
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let served = safespace_api::start_server(&server_config, state).await;

    store.close().await;
    info!("safespace-server stopped");

    served.map_err(AppError::from)
}

/// Load `safespace-config.yaml`, falling back to defaults (plus
/// environment overrides) when the file is absent.
fn load_config() -> Result<(SafeSpaceConfig, bool), AppError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((SafeSpaceConfig::from_file(config_path)?, true))
    } else {
        let mut config = SafeSpaceConfig::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok((config, false))
    }
}

/// Load the ward dataset, refusing to continue when it is unusable.
fn load_dataset(path: &Path) -> Result<SafetyDataset, AppError> {
    SafetyDataset::load(path)
        .and_then(|dataset| {
            if dataset.is_empty() {
                Err(SafetyError::EmptyDataset)
            } else {
                Ok(dataset)
            }
        })
        .inspect_err(|e| {
            let stage = if e.is_load_error() { "load" } else { "validation" };
            error!(
                path = %path.display(),
                stage,
                error = %e,
                "Safety dataset unusable, refusing to start"
            );
        })
        .map_err(AppError::from)
}

/// Install the global tracing subscriber. `RUST_LOG` takes precedence
/// over the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<(), AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| AppError::Logging {
        message: e.to_string(),
    })
}

/// Connect to `PostgreSQL` and migrate when a URL is configured, otherwise
/// fall back to the in-memory store.
async fn open_store(database: &DatabaseConfig) -> Result<Store, AppError> {
    if !database.is_configured() {
        warn!("No database URL configured; users and experiences are kept in memory only");
        return Ok(Store::memory());
    }

    let pg_config =
        PostgresConfig::new(&database.url).with_max_connections(database.max_connections);
    let pool = PostgresPool::connect(&pg_config).await?;
    pool.run_migrations().await?;
    Ok(Store::Postgres(pool))
}
