//! Record Login Use Case
//!
//! Called by the frontend after every sign-in. The first call for an email
//! creates the user; later calls only refresh `last_loggedIn`. The role is
//! never taken from the request.

use std::sync::Arc;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::shared::api_common::non_blank;
use crate::user::entity::User;
use crate::user::repository::{LoginOutcome, UserRepository};
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordLoginCommand {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserLoggedIn {
    pub success: bool,
    /// True when this login created the user
    pub created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted_id: Option<String>,
    pub last_logged_in: String,
}

pub struct RecordLoginUseCase {
    users: Arc<dyn UserRepository>,
}

impl RecordLoginUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn execute(
        &self,
        command: RecordLoginCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<UserLoggedIn> {
        let Some(email) = non_blank(command.email.as_deref()).map(str::to_string) else {
            return UseCaseResult::failure(UseCaseError::validation(
                "EMAIL_REQUIRED",
                "Email is required",
            ));
        };

        let mut user = User::new(&email);
        user.name = non_blank(command.name.as_deref()).map(str::to_string);
        user.image = non_blank(command.image.as_deref()).map(str::to_string);

        let logged_in_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let outcome = match self.users.record_login(&user, &logged_in_at).await {
            Ok(outcome) => outcome,
            Err(e) => return UseCaseResult::failure(e.into()),
        };

        let (created, inserted_id) = match outcome {
            LoginOutcome::Created(id) => {
                info!(email = %email, execution_id = %ctx.execution_id, "Created user on first login");
                (true, Some(id.to_hex()))
            }
            LoginOutcome::Updated => (false, None),
        };

        UseCaseResult::success(UserLoggedIn {
            success: true,
            created,
            inserted_id,
            last_logged_in: logged_in_at,
        })
    }
}
