//! Decora Configuration System
//!
//! TOML-based configuration with environment variable override support.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub mongodb: MongoConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub payment: PaymentConfig,

    /// Seed development data on startup
    pub dev_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            mongodb: MongoConfig::default(),
            store: StoreConfig::default(),
            auth: AuthConfig::default(),
            payment: PaymentConfig::default(),
            dev_mode: false,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub host: String,
    /// Allowed browser origins; `"*"` allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:5174".to_string(),
            ],
        }
    }
}

/// MongoDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "decorationDB".to_string(),
        }
    }
}

/// Storage backend for the entity collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongodb,
    /// Process-local collections, lost on restart
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(Self::Mongodb),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::ValidationError(format!("Unknown store backend: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { backend: StoreBackend::Mongodb }
    }
}

/// Identity provider used to verify bearer tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// Firebase Authentication ID tokens
    Firebase,
    /// Fixed token to email table, for development
    Static,
}

impl std::str::FromStr for AuthProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "firebase" => Ok(Self::Firebase),
            "static" => Ok(Self::Static),
            other => Err(ConfigError::ValidationError(format!("Unknown auth provider: {}", other))),
        }
    }
}

/// Token verification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub provider: AuthProvider,
    /// Firebase project id; expected issuer suffix and audience
    pub firebase_project_id: String,
    /// Base64 encoded service account JSON; `project_id` is read from it
    /// when `firebase_project_id` is empty
    pub service_account_key: String,
    /// JWKS endpoint for the securetoken signing keys
    pub jwks_url: String,
    pub jwks_cache_ttl_secs: u64,
    /// token -> email, only used by the static provider
    pub static_tokens: BTreeMap<String, String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider: AuthProvider::Firebase,
            firebase_project_id: String::new(),
            service_account_key: String::new(),
            jwks_url: "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com"
                .to_string(),
            jwks_cache_ttl_secs: 3600,
            static_tokens: BTreeMap::new(),
        }
    }
}

/// Payment processor selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Stripe,
    /// In-process checkout sessions, for development
    Simulated,
}

impl std::str::FromStr for PaymentProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stripe" => Ok(Self::Stripe),
            "simulated" => Ok(Self::Simulated),
            other => Err(ConfigError::ValidationError(format!("Unknown payment provider: {}", other))),
        }
    }
}

/// Checkout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub provider: PaymentProvider,
    pub secret_key: String,
    pub api_base: String,
    /// ISO currency code, lowercase
    pub currency: String,
    /// Frontend origin used to build success and cancel URLs
    pub client_domain: String,
    pub timeout_secs: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            provider: PaymentProvider::Stripe,
            secret_key: String::new(),
            api_base: "https://api.stripe.com".to_string(),
            currency: "usd".to_string(),
            client_domain: "http://localhost:5173".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::ValidationError("http.port must be non-zero".into()));
        }
        if self.store.backend == StoreBackend::Mongodb {
            if self.mongodb.uri.trim().is_empty() {
                return Err(ConfigError::ValidationError("mongodb.uri is required".into()));
            }
            if self.mongodb.database.trim().is_empty() {
                return Err(ConfigError::ValidationError("mongodb.database is required".into()));
            }
        }
        if self.auth.provider == AuthProvider::Firebase
            && self.auth.firebase_project_id.trim().is_empty()
            && self.auth.service_account_key.trim().is_empty()
        {
            return Err(ConfigError::ValidationError(
                "auth.firebase_project_id or auth.service_account_key is required for the firebase provider".into(),
            ));
        }
        if self.payment.provider == PaymentProvider::Stripe && self.payment.secret_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "payment.secret_key is required for the stripe provider".into(),
            ));
        }
        if self.payment.currency.trim().len() != 3 {
            return Err(ConfigError::ValidationError(format!(
                "payment.currency must be a 3-letter code, got '{}'",
                self.payment.currency
            )));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# Decora Configuration
# Environment variables override these settings

dev_mode = false

[http]
port = 3000
host = "0.0.0.0"
cors_origins = ["http://localhost:5173"]

[mongodb]
uri = "mongodb://localhost:27017"
database = "decorationDB"

[store]
backend = "mongodb"

[auth]
provider = "firebase"
firebase_project_id = "my-project"

[payment]
provider = "stripe"
secret_key = "sk_test_..."
currency = "usd"
client_domain = "http://localhost:5173"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.mongodb.database, "decorationDB");
        assert_eq!(config.store.backend, StoreBackend::Mongodb);
        assert_eq!(config.payment.currency, "usd");
        assert!(!config.dev_mode);
    }

    #[test]
    fn test_example_toml_parses_and_validates() {
        let config = AppConfig::from_toml_str(&AppConfig::example_toml()).unwrap();
        assert_eq!(config.auth.firebase_project_id, "my-project");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str("[http]\nport = 9000\n").unwrap();
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.mongodb.database, "decorationDB");
    }

    #[test]
    fn test_static_tokens_table() {
        let config = AppConfig::from_toml_str(
            "[auth]\nprovider = \"static\"\n[auth.static_tokens]\nadmin-token = \"admin@example.com\"\n",
        )
        .unwrap();
        assert_eq!(config.auth.provider, AuthProvider::Static);
        assert_eq!(
            config.auth.static_tokens.get("admin-token").map(String::as_str),
            Some("admin@example.com")
        );
    }

    #[test]
    fn test_validation_requires_payment_key_for_stripe() {
        let mut config = AppConfig::default();
        config.auth.firebase_project_id = "p".into();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        config.payment.provider = PaymentProvider::Simulated;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_skips_mongo_for_memory_backend() {
        let mut config = AppConfig::default();
        config.auth.provider = AuthProvider::Static;
        config.payment.provider = PaymentProvider::Simulated;
        config.mongodb.database = String::new();
        assert!(config.validate().is_err());

        config.store.backend = StoreBackend::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("Mongo".parse::<StoreBackend>().unwrap(), StoreBackend::Mongodb);
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("redis".parse::<StoreBackend>().is_err());
        assert_eq!("STRIPE".parse::<PaymentProvider>().unwrap(), PaymentProvider::Stripe);
        assert_eq!("static".parse::<AuthProvider>().unwrap(), AuthProvider::Static);
    }
}
