//! Decorators API

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::decorator::availability::{FindAvailableDecoratorsQuery, FindAvailableDecoratorsUseCase};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::user::api::UserResponse;
use crate::user::repository::UserRepository;
use crate::usecase::{ExecutionContext, UseCaseResult};

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableDecoratorsResponse {
    pub available: bool,
    pub decorators: Vec<UserResponse>,
}

#[derive(Clone)]
pub struct DecoratorsState {
    pub users: Arc<dyn UserRepository>,
    pub availability_use_case: Arc<FindAvailableDecoratorsUseCase>,
}

impl DecoratorsState {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            availability_use_case: Arc::new(FindAvailableDecoratorsUseCase::new(users.clone())),
            users,
        }
    }
}

/// Decorators free to take a booking on a given day
#[utoipa::path(
    get,
    path = "/decorators/available",
    tag = "decorators",
    params(FindAvailableDecoratorsQuery),
    responses(
        (status = 200, description = "Matching decorators", body = AvailableDecoratorsResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn find_available_decorators(
    State(state): State<DecoratorsState>,
    auth: Authenticated,
    Query(query): Query<FindAvailableDecoratorsQuery>,
) -> Result<Json<AvailableDecoratorsResponse>, PlatformError> {
    let ctx = ExecutionContext::create(auth.email.clone());

    match state.availability_use_case.execute(query, ctx).await {
        UseCaseResult::Success(result) => Ok(Json(AvailableDecoratorsResponse {
            available: result.available,
            decorators: result.decorators.into_iter().map(UserResponse::from).collect(),
        })),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Every user holding the decorator role
#[utoipa::path(
    get,
    path = "/Deco_Available",
    tag = "decorators",
    responses(
        (status = 200, description = "All decorators", body = Vec<UserResponse>)
    )
)]
pub async fn list_decorators(
    State(state): State<DecoratorsState>,
) -> Result<Json<Vec<UserResponse>>, PlatformError> {
    let decorators = state.users.find_decorators(None, None).await?;
    Ok(Json(decorators.into_iter().map(UserResponse::from).collect()))
}

/// Create decorators router
pub fn decorators_router(state: DecoratorsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(find_available_decorators))
        .routes(routes!(list_decorators))
        .with_state(state)
}
