//! Decora Platform Server
//!
//! Serves the booking marketplace REST API plus Swagger UI.
//!
//! Configuration comes from `config.toml` (or `DECORA_CONFIG`) with
//! environment overrides:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DECORA_HTTP_PORT` / `PORT` | `3000` | HTTP API port |
//! | `DECORA_MONGODB_URI` / `MONGODB_URI` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `DECORA_MONGODB_DATABASE` | `decorationDB` | MongoDB database name |
//! | `DECORA_STORE_BACKEND` | `mongodb` | `mongodb` or `memory` |
//! | `DECORA_AUTH_PROVIDER` | `firebase` | `firebase` or `static` |
//! | `DECORA_SERVICE_ACCOUNT_KEY` / `FB_SERVICE_KEY` | - | Base64 service account JSON |
//! | `DECORA_PAYMENT_PROVIDER` | `stripe` | `stripe` or `simulated` |
//! | `DECORA_PAYMENT_SECRET_KEY` / `STRIPE_SECRET_KEY` | - | Processor secret key |
//! | `DECORA_CLIENT_DOMAIN` / `CLIENT_DOMAIN` | `http://localhost:5173` | Frontend origin for redirects |
//! | `DECORA_DEV_MODE` | `false` | Seed development data |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::http::HeaderValue;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa_swagger_ui::SwaggerUi;

use dc_config::{AppConfig, AuthProvider, PaymentProvider, StoreBackend};
use dc_platform::auth::project_id_from_service_account;
use dc_platform::shared::health_api::HealthState;
use dc_platform::shared::indexes::initialize_indexes;
use dc_platform::{
    build_platform, CheckoutSettings, DevDataSeeder, FirebaseTokenVerifier, IdentityVerifier,
    PaymentGateway, PlatformServices, Repositories, SimulatedGateway, StaticTokenVerifier,
    StripeConfig, StripeGateway,
};

#[tokio::main]
async fn main() -> Result<()> {
    dc_common::init_logging("dc-platform-server");

    info!("Starting Decora Platform Server");

    let config = AppConfig::load()?;

    // Storage
    let (repos, db) = match config.store.backend {
        StoreBackend::Mongodb => {
            info!("Connecting to MongoDB: {}/{}", config.mongodb.uri, config.mongodb.database);
            let client = mongodb::Client::with_uri_str(&config.mongodb.uri).await?;
            let db = client.database(&config.mongodb.database);
            initialize_indexes(&db).await?;
            (Repositories::mongo(&db), Some(db))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            (Repositories::in_memory(), None)
        }
    };
    info!("Repositories initialized");

    if config.dev_mode {
        if let Err(e) = DevDataSeeder::new(repos.clone()).seed().await {
            warn!("Dev data seeding skipped: {}", e);
        }
    }

    let identity = build_identity(&config)?;
    let gateway = build_gateway(&config)?;

    let app = build_platform(PlatformServices {
        repos,
        identity,
        gateway,
        checkout: CheckoutSettings {
            currency: config.payment.currency.clone(),
            client_domain: config.payment.client_domain.clone(),
        },
        health: HealthState::new(db, Some(env!("CARGO_PKG_VERSION").to_string())),
    });

    let router = app
        .router
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", app.openapi))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.http.cors_origins));

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);
    info!("Swagger UI at http://{}/swagger-ui", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(dc_common::shutdown_signal())
        .await?;

    info!("Decora Platform Server shutdown complete");
    Ok(())
}

fn build_identity(config: &AppConfig) -> Result<Arc<dyn IdentityVerifier>> {
    match config.auth.provider {
        AuthProvider::Firebase => {
            let project_id = if config.auth.firebase_project_id.trim().is_empty() {
                project_id_from_service_account(&config.auth.service_account_key)?
            } else {
                config.auth.firebase_project_id.clone()
            };
            info!(project_id = %project_id, "Verifying Firebase ID tokens");
            Ok(Arc::new(FirebaseTokenVerifier::new(
                project_id,
                config.auth.jwks_url.clone(),
                Duration::from_secs(config.auth.jwks_cache_ttl_secs),
            )))
        }
        AuthProvider::Static => {
            warn!(tokens = config.auth.static_tokens.len(), "Using static bearer tokens");
            Ok(Arc::new(StaticTokenVerifier::new(config.auth.static_tokens.clone())))
        }
    }
}

fn build_gateway(config: &AppConfig) -> Result<Arc<dyn PaymentGateway>> {
    match config.payment.provider {
        PaymentProvider::Stripe => Ok(Arc::new(StripeGateway::new(StripeConfig {
            secret_key: config.payment.secret_key.clone(),
            api_base: config.payment.api_base.clone(),
            timeout: Duration::from_secs(config.payment.timeout_secs),
        })?)),
        PaymentProvider::Simulated => {
            warn!("Using the simulated payment gateway; no money moves");
            Ok(Arc::new(SimulatedGateway::new()))
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
