//! Decorator Requests API

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::promotion::entity::{PromotionRequest, RequestStatus};
use crate::promotion::operations::{
    ApproveRequestCommand, ApproveRequestUseCase, PromotionRequested, RejectRequestCommand,
    RejectRequestUseCase, RequestApproved, RequestPromotionCommand, RequestPromotionUseCase,
    RequestRejected,
};
use crate::promotion::repository::PromotionRequestRepository;
use crate::shared::error::PlatformError;
use crate::shared::middleware::AdminOnly;
use crate::user::repository::UserRepository;
use crate::usecase::{ExecutionContext, UseCaseResult};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRequestResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub division: String,
    pub district: String,
    pub phone: String,
    pub role: String,
    pub status: RequestStatus,
    pub requested_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<String>,
}

impl From<PromotionRequest> for PromotionRequestResponse {
    fn from(r: PromotionRequest) -> Self {
        Self {
            id: r.id_hex(),
            name: r.name,
            email: r.email,
            division: r.division,
            district: r.district,
            phone: r.phone,
            role: r.role,
            status: r.status,
            requested_at: r.requested_at.to_rfc3339(),
            approved_at: r.approved_at.map(|t| t.to_rfc3339()),
            rejected_at: r.rejected_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Clone)]
pub struct PromotionRequestsState {
    pub requests: Arc<dyn PromotionRequestRepository>,
    pub request_use_case: Arc<RequestPromotionUseCase>,
    pub approve_use_case: Arc<ApproveRequestUseCase>,
    pub reject_use_case: Arc<RejectRequestUseCase>,
}

impl PromotionRequestsState {
    pub fn new(requests: Arc<dyn PromotionRequestRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            request_use_case: Arc::new(RequestPromotionUseCase::new(requests.clone())),
            approve_use_case: Arc::new(ApproveRequestUseCase::new(requests.clone(), users)),
            reject_use_case: Arc::new(RejectRequestUseCase::new(requests.clone())),
            requests,
        }
    }
}

/// Apply to become a decorator
#[utoipa::path(
    post,
    path = "/decorator-requests",
    tag = "decorator-requests",
    request_body = RequestPromotionCommand,
    responses(
        (status = 200, description = "Request submitted", body = PromotionRequested),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "A pending or approved request already exists")
    )
)]
pub async fn submit_request(
    State(state): State<PromotionRequestsState>,
    Json(command): Json<RequestPromotionCommand>,
) -> Result<Json<PromotionRequested>, PlatformError> {
    match state.request_use_case.execute(command, ExecutionContext::anonymous()).await {
        UseCaseResult::Success(requested) => Ok(Json(requested)),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// List promotion requests, newest first
#[utoipa::path(
    get,
    path = "/decorator-requests",
    tag = "decorator-requests",
    responses(
        (status = 200, description = "All requests", body = Vec<PromotionRequestResponse>)
    )
)]
pub async fn list_requests(
    State(state): State<PromotionRequestsState>,
) -> Result<Json<Vec<PromotionRequestResponse>>, PlatformError> {
    let requests = state.requests.find_all().await?;
    Ok(Json(requests.into_iter().map(PromotionRequestResponse::from).collect()))
}

/// Approve a request and promote the user
#[utoipa::path(
    patch,
    path = "/decorator-requests/approve/{id}",
    tag = "decorator-requests",
    params(
        ("id" = String, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request approved", body = RequestApproved),
        (status = 404, description = "Request not found"),
        (status = 500, description = "Request approved but user not promoted")
    )
)]
pub async fn approve_request(
    State(state): State<PromotionRequestsState>,
    Path(id): Path<String>,
) -> Result<Json<RequestApproved>, PlatformError> {
    let command = ApproveRequestCommand { request_id: id };

    match state.approve_use_case.execute(command, ExecutionContext::anonymous()).await {
        UseCaseResult::Success(approved) => Ok(Json(approved)),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Reject a request
#[utoipa::path(
    patch,
    path = "/decorator-requests/reject/{id}",
    tag = "decorator-requests",
    params(
        ("id" = String, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request rejected", body = RequestRejected),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reject_request(
    State(state): State<PromotionRequestsState>,
    auth: AdminOnly,
    Path(id): Path<String>,
) -> Result<Json<RequestRejected>, PlatformError> {
    let command = RejectRequestCommand { request_id: id };
    let ctx = ExecutionContext::create(auth.email.clone());

    match state.reject_use_case.execute(command, ctx).await {
        UseCaseResult::Success(rejected) => Ok(Json(rejected)),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Create decorator requests router
pub fn promotion_requests_router(state: PromotionRequestsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(submit_request, list_requests))
        .routes(routes!(approve_request))
        .routes(routes!(reject_request))
        .with_state(state)
}
