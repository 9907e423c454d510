//! Update User Role Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::details;
use crate::shared::api_common::non_blank;
use crate::user::entity::UserRole;
use crate::user::repository::UserRepository;
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRoleCommand {
    #[serde(default)]
    pub email: Option<String>,
    /// One of `customer`, `decorator`, `admin`
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRoleChanged {
    pub success: bool,
    pub email: String,
    pub role: UserRole,
}

pub struct UpdateUserRoleUseCase {
    users: Arc<dyn UserRepository>,
}

impl UpdateUserRoleUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn execute(
        &self,
        command: UpdateUserRoleCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<UserRoleChanged> {
        self.run(command, ctx).await.into()
    }

    async fn run(
        &self,
        command: UpdateUserRoleCommand,
        ctx: ExecutionContext,
    ) -> Result<UserRoleChanged, UseCaseError> {
        let email = non_blank(command.email.as_deref())
            .ok_or_else(|| UseCaseError::validation("EMAIL_REQUIRED", "Email is required"))?
            .to_string();

        let requested = command.role.as_deref().unwrap_or_default();
        let role = UserRole::parse(requested).ok_or_else(|| {
            UseCaseError::validation_with_details(
                "INVALID_ROLE",
                "Role must be one of customer, decorator, admin",
                details! { "role" => requested },
            )
        })?;

        if !self.users.update_role(&email, role).await? {
            return Err(UseCaseError::not_found_with_details(
                "USER_NOT_FOUND",
                format!("No user with email {}", email),
                details! { "email" => &email },
            ));
        }

        info!(
            email = %email,
            role = role.as_str(),
            changed_by = %ctx.principal_id,
            "User role changed"
        );

        Ok(UserRoleChanged {
            success: true,
            email,
            role,
        })
    }
}
