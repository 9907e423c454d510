//! Decorations API
//!
//! Public listing catalogue.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::decoration::entity::{Decoration, DecorationFilter};
use crate::decoration::operations::{
    CreateDecorationUseCase, DecorationInput, DeleteDecorationUseCase, UpdateDecorationUseCase,
};
use crate::decoration::repository::DecorationRepository;
use crate::shared::api_common::{non_blank, parse_object_id, CreatedResponse, SuccessResponse};
use crate::shared::error::PlatformError;
use crate::usecase::{ExecutionContext, UseCaseResult};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecorationResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<Decoration> for DecorationResponse {
    fn from(d: Decoration) -> Self {
        Self {
            id: d.id_hex(),
            name: d.name,
            category: d.category,
            description: d.description,
            price: d.price,
            image: d.image,
            created_at: d.created_at.map(|t| t.to_rfc3339()),
            updated_at: d.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Query parameters for the decorations list
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DecorationsQuery {
    /// Exact category, case-insensitive
    pub category: Option<String>,
    /// Part of the name, case-insensitive
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct DecorationsState {
    pub decorations: Arc<dyn DecorationRepository>,
    pub create_use_case: Arc<CreateDecorationUseCase>,
    pub update_use_case: Arc<UpdateDecorationUseCase>,
    pub delete_use_case: Arc<DeleteDecorationUseCase>,
}

impl DecorationsState {
    pub fn new(decorations: Arc<dyn DecorationRepository>) -> Self {
        Self {
            create_use_case: Arc::new(CreateDecorationUseCase::new(decorations.clone())),
            update_use_case: Arc::new(UpdateDecorationUseCase::new(decorations.clone())),
            delete_use_case: Arc::new(DeleteDecorationUseCase::new(decorations.clone())),
            decorations,
        }
    }
}

/// List decorations
#[utoipa::path(
    get,
    path = "/decorations",
    tag = "decorations",
    params(DecorationsQuery),
    responses(
        (status = 200, description = "Matching decorations", body = Vec<DecorationResponse>)
    )
)]
pub async fn list_decorations(
    State(state): State<DecorationsState>,
    Query(query): Query<DecorationsQuery>,
) -> Result<Json<Vec<DecorationResponse>>, PlatformError> {
    let filter = DecorationFilter {
        category: non_blank(query.category.as_deref()).map(str::to_string),
        search: non_blank(query.search.as_deref()).map(str::to_string),
    };
    let decorations = state.decorations.find(&filter).await?;
    Ok(Json(decorations.into_iter().map(DecorationResponse::from).collect()))
}

/// Get a decoration by id
#[utoipa::path(
    get,
    path = "/decorations/{id}",
    tag = "decorations",
    params(
        ("id" = String, Path, description = "Decoration ID")
    ),
    responses(
        (status = 200, description = "Decoration found", body = DecorationResponse),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Decoration not found")
    )
)]
pub async fn get_decoration(
    State(state): State<DecorationsState>,
    Path(id): Path<String>,
) -> Result<Json<DecorationResponse>, PlatformError> {
    let oid = parse_object_id(&id)?;
    let decoration = state.decorations.find_by_id(&oid).await?
        .ok_or_else(|| PlatformError::not_found("Decoration", &id))?;
    Ok(Json(decoration.into()))
}

/// Create a decoration
#[utoipa::path(
    post,
    path = "/decorations",
    tag = "decorations",
    request_body = DecorationInput,
    responses(
        (status = 200, description = "Decoration created", body = CreatedResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_decoration(
    State(state): State<DecorationsState>,
    Json(input): Json<DecorationInput>,
) -> Result<Json<CreatedResponse>, PlatformError> {
    match state.create_use_case.execute(input, ExecutionContext::anonymous()).await {
        UseCaseResult::Success(saved) => Ok(Json(CreatedResponse::new(saved.decoration_id))),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Replace a decoration's fields
#[utoipa::path(
    put,
    path = "/decorations/{id}",
    tag = "decorations",
    params(
        ("id" = String, Path, description = "Decoration ID")
    ),
    request_body = DecorationInput,
    responses(
        (status = 200, description = "Decoration updated", body = DecorationResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Decoration not found")
    )
)]
pub async fn update_decoration(
    State(state): State<DecorationsState>,
    Path(id): Path<String>,
    Json(input): Json<DecorationInput>,
) -> Result<Json<DecorationResponse>, PlatformError> {
    match state.update_use_case.execute(&id, input, ExecutionContext::anonymous()).await {
        UseCaseResult::Success(saved) => {
            let oid = parse_object_id(&saved.decoration_id)?;
            let decoration = state.decorations.find_by_id(&oid).await?
                .ok_or_else(|| PlatformError::not_found("Decoration", &id))?;
            Ok(Json(decoration.into()))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Delete a decoration
#[utoipa::path(
    delete,
    path = "/decorations/{id}",
    tag = "decorations",
    params(
        ("id" = String, Path, description = "Decoration ID")
    ),
    responses(
        (status = 200, description = "Decoration deleted", body = SuccessResponse),
        (status = 404, description = "Decoration not found")
    )
)]
pub async fn delete_decoration(
    State(state): State<DecorationsState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    match state.delete_use_case.execute(&id, ExecutionContext::anonymous()).await {
        UseCaseResult::Success(_) => Ok(Json(SuccessResponse::ok())),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Create decorations router
pub fn decorations_router(state: DecorationsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_decorations, create_decoration))
        .routes(routes!(get_decoration, update_decoration, delete_decoration))
        .with_state(state)
}
