//! Users API
//!
//! Login bookkeeping, role lookup and the admin role switch.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::shared::error::PlatformError;
use crate::shared::middleware::{AdminOnly, Authenticated};
use crate::user::entity::{User, UserRole, WorkStatus};
use crate::user::operations::{
    RecordLoginCommand, RecordLoginUseCase, UpdateUserRoleCommand, UpdateUserRoleUseCase,
    UserLoggedIn, UserRoleChanged,
};
use crate::user::repository::UserRepository;
use crate::usecase::{ExecutionContext, UseCaseResult};

/// User as returned to the frontend. Keys follow the stored document.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(rename = "work_Status", skip_serializing_if = "Option::is_none")]
    pub work_status: Option<WorkStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(rename = "last_loggedIn", skip_serializing_if = "Option::is_none")]
    pub last_logged_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id_hex(),
            email: u.email,
            name: u.name,
            image: u.image,
            role: u.role,
            work_status: u.work_status,
            division: u.division,
            district: u.district,
            phone: u.phone,
            working_date: u.working_date.map(|date| date.to_text()),
            start_time: u.start_time,
            end_time: u.end_time,
            last_logged_in: u.last_logged_in,
            created_at: u.created_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleResponse {
    /// `decorator`, `admin`, or null for customers
    pub role: Option<String>,
}

#[derive(Clone)]
pub struct UsersState {
    pub users: Arc<dyn UserRepository>,
    pub record_login_use_case: Arc<RecordLoginUseCase>,
    pub update_role_use_case: Arc<UpdateUserRoleUseCase>,
}

impl UsersState {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            record_login_use_case: Arc::new(RecordLoginUseCase::new(users.clone())),
            update_role_use_case: Arc::new(UpdateUserRoleUseCase::new(users.clone())),
            users,
        }
    }
}

/// Record a login, creating the user on first sign-in
#[utoipa::path(
    post,
    path = "/user",
    tag = "users",
    request_body = RecordLoginCommand,
    responses(
        (status = 200, description = "Login recorded", body = UserLoggedIn),
        (status = 400, description = "Email missing")
    )
)]
pub async fn record_login(
    State(state): State<UsersState>,
    Json(command): Json<RecordLoginCommand>,
) -> Result<Json<UserLoggedIn>, PlatformError> {
    let ctx = ExecutionContext::anonymous();

    match state.record_login_use_case.execute(command, ctx).await {
        UseCaseResult::Success(logged_in) => Ok(Json(logged_in)),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Role of the calling user
#[utoipa::path(
    get,
    path = "/user/role",
    tag = "users",
    responses(
        (status = 200, description = "Caller's role", body = RoleResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_own_role(
    State(state): State<UsersState>,
    auth: Authenticated,
) -> Result<Json<RoleResponse>, PlatformError> {
    let role = state
        .users
        .find_by_email(&auth.email)
        .await?
        .and_then(|user| user.role)
        .filter(|role| UserRole::parse(role).is_some());

    Ok(Json(RoleResponse { role }))
}

/// List all users
#[utoipa::path(
    get,
    path = "/userManage",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<UsersState>,
    _auth: Authenticated,
) -> Result<Json<Vec<UserResponse>>, PlatformError> {
    let users = state.users.find_all().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Change a user's role
#[utoipa::path(
    patch,
    path = "/users/update-role",
    tag = "users",
    request_body = UpdateUserRoleCommand,
    responses(
        (status = 200, description = "Role changed", body = UserRoleChanged),
        (status = 400, description = "Unknown role"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No user with that email")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user_role(
    State(state): State<UsersState>,
    auth: AdminOnly,
    Json(command): Json<UpdateUserRoleCommand>,
) -> Result<Json<UserRoleChanged>, PlatformError> {
    let ctx = ExecutionContext::create(auth.email.clone());

    match state.update_role_use_case.execute(command, ctx).await {
        UseCaseResult::Success(changed) => Ok(Json(changed)),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Create users router
pub fn users_router(state: UsersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(record_login))
        .routes(routes!(get_own_role))
        .routes(routes!(list_users))
        .routes(routes!(update_user_role))
        .with_state(state)
}
