//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "decora.toml",
    "./config/config.toml",
    "/etc/decora/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, |key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
            warn!(?path, "Configured config file does not exist, searching defaults");
        }

        if let Ok(path) = env::var("DECORA_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// First non-empty value among `keys`
fn first_of<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.trim().is_empty())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| {
        ConfigError::ValidationError(format!("{} must be a number, got '{}'", key, value))
    })
}

/// Apply `DECORA_*` overrides, plus the unprefixed names older deployments
/// used (`PORT`, `MONGODB_URI`, `FB_SERVICE_KEY`, `STRIPE_SECRET_KEY`,
/// `CLIENT_DOMAIN`).
pub(crate) fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(val) = first_of(&lookup, &["DECORA_HTTP_PORT", "PORT"]) {
        config.http.port = parse_number("DECORA_HTTP_PORT", &val)?;
    }
    if let Some(val) = first_of(&lookup, &["DECORA_HTTP_HOST"]) {
        config.http.host = val;
    }
    if let Some(val) = first_of(&lookup, &["DECORA_CORS_ORIGINS"]) {
        config.http.cors_origins = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    // MongoDB
    if let Some(val) = first_of(&lookup, &["DECORA_MONGODB_URI", "MONGODB_URI"]) {
        config.mongodb.uri = val;
    }
    if let Some(val) = first_of(&lookup, &["DECORA_MONGODB_DATABASE"]) {
        config.mongodb.database = val;
    }
    if let Some(val) = first_of(&lookup, &["DECORA_STORE_BACKEND"]) {
        config.store.backend = val.parse()?;
    }

    // Auth
    if let Some(val) = first_of(&lookup, &["DECORA_AUTH_PROVIDER"]) {
        config.auth.provider = val.parse()?;
    }
    if let Some(val) = first_of(&lookup, &["DECORA_FIREBASE_PROJECT_ID"]) {
        config.auth.firebase_project_id = val;
    }
    if let Some(val) = first_of(&lookup, &["DECORA_SERVICE_ACCOUNT_KEY", "FB_SERVICE_KEY"]) {
        config.auth.service_account_key = val;
    }

    // Payment
    if let Some(val) = first_of(&lookup, &["DECORA_PAYMENT_PROVIDER"]) {
        config.payment.provider = val.parse()?;
    }
    if let Some(val) = first_of(&lookup, &["DECORA_PAYMENT_SECRET_KEY", "STRIPE_SECRET_KEY"]) {
        config.payment.secret_key = val;
    }
    if let Some(val) = first_of(&lookup, &["DECORA_PAYMENT_CURRENCY"]) {
        config.payment.currency = val.to_lowercase();
    }
    if let Some(val) = first_of(&lookup, &["DECORA_CLIENT_DOMAIN", "CLIENT_DOMAIN"]) {
        config.payment.client_domain = val.trim_end_matches('/').to_string();
    }

    if let Some(val) = first_of(&lookup, &["DECORA_DEV_MODE"]) {
        config.dev_mode = val == "1" || val.eq_ignore_ascii_case("true");
    }

    Ok(())
}
