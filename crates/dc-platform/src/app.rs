//! Application assembly
//!
//! Builds every API router over one repository set and wraps them in the
//! auth layer. The server binary adds Swagger UI, tracing and CORS on top.

use axum::Router;
use std::sync::Arc;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::auth::authorization_service::AuthorizationService;
use crate::auth::identity::IdentityVerifier;
use crate::booking::api::{bookings_router, BookingsState};
use crate::decoration::api::{decorations_router, DecorationsState};
use crate::decorator::api::{decorators_router, DecoratorsState};
use crate::payment::api::{payments_router, PaymentsState};
use crate::payment::gateway::PaymentGateway;
use crate::payment::operations::CheckoutSettings;
use crate::promotion::api::{promotion_requests_router, PromotionRequestsState};
use crate::shared::health_api::{health_router, HealthState};
use crate::shared::middleware::{AppState, AuthLayer};
use crate::shared::stores::Repositories;
use crate::user::api::{users_router, UsersState};

/// Everything the routers need
#[derive(Clone)]
pub struct PlatformServices {
    pub repos: Repositories,
    pub identity: Arc<dyn IdentityVerifier>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub checkout: CheckoutSettings,
    pub health: HealthState,
}

/// Router with the auth layer applied, plus the collected OpenAPI document
pub struct PlatformApp {
    pub router: Router,
    pub openapi: OpenApi,
}

pub fn build_platform(services: PlatformServices) -> PlatformApp {
    let PlatformServices {
        repos,
        identity,
        gateway,
        checkout,
        health,
    } = services;

    let app_state = AppState {
        identity,
        authz_service: Arc::new(AuthorizationService::new(repos.users.clone())),
    };

    let (router, mut openapi) = OpenApiRouter::new()
        .merge(health_router(health))
        .merge(users_router(UsersState::new(repos.users.clone())))
        .merge(decorations_router(DecorationsState::new(repos.decorations.clone())))
        .merge(bookings_router(BookingsState::new(repos.bookings.clone(), repos.users.clone())))
        .merge(decorators_router(DecoratorsState::new(repos.users.clone())))
        .merge(promotion_requests_router(PromotionRequestsState::new(
            repos.promotions.clone(),
            repos.users.clone(),
        )))
        .merge(payments_router(PaymentsState::new(
            gateway,
            checkout,
            repos.decorations.clone(),
            repos.bookings.clone(),
        )))
        .split_for_parts();

    openapi.info.title = "Decora Platform API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description = Some("Decoration listings, bookings, checkout and decorator management".to_string());
    openapi
        .components
        .get_or_insert_with(Default::default)
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );

    PlatformApp {
        router: router.layer(AuthLayer::new(app_state)),
        openapi,
    }
}
