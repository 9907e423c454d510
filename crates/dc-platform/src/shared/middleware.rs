//! API Middleware
//!
//! Bearer token authentication and the admin guard as Axum extractors.
//! `AuthLayer` puts the shared `AppState` into request extensions so the
//! extractors work under any router state.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::auth::identity::{extract_bearer_token, IdentityVerifier};
use crate::auth::authorization_service::{AuthContext, AuthorizationService};
use crate::shared::error::PlatformError;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityVerifier>,
    pub authz_service: Arc<AuthorizationService>,
}

/// Authenticated caller extractor. Missing or invalid token is a 401.
pub struct Authenticated(pub AuthContext);

impl std::ops::Deref for Authenticated {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Authenticated caller whose user record has the admin role.
/// Non-admins get a 403.
pub struct AdminOnly(pub AuthContext);

impl std::ops::Deref for AdminOnly {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn app_state(parts: &Parts) -> Result<AppState, PlatformError> {
    parts
        .extensions
        .get::<AppState>()
        .cloned()
        .ok_or_else(|| PlatformError::internal("Auth service not configured"))
}

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let app_state = app_state(parts)?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(|| PlatformError::unauthorized("missing bearer token"))?;

        let principal = app_state.identity.verify(token).await.map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            match e {
                PlatformError::InvalidToken { .. } | PlatformError::Unauthorized { .. } => e,
                other => PlatformError::unauthorized(other.to_string()),
            }
        })?;

        Ok(Authenticated(principal.into()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(context) = Authenticated::from_request_parts(parts, state).await?;
        let app_state = app_state(parts)?;
        app_state.authz_service.require_admin(&context).await?;
        Ok(AdminOnly(context))
    }
}

/// Middleware layer that injects AppState into request extensions
#[derive(Clone)]
pub struct AuthLayer {
    state: AppState,
}

impl AuthLayer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    state: AppState,
}

impl<S, B> Service<axum::http::Request<B>> for AuthMiddleware<S>
where
    S: Service<axum::http::Request<B>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(self.state.clone());
        Box::pin(self.inner.call(req))
    }
}
