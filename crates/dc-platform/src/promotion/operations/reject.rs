//! Reject Promotion Request Use Case

use std::sync::Arc;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::details;
use crate::promotion::entity::RequestStatus;
use crate::promotion::repository::PromotionRequestRepository;
use crate::shared::api_common::parse_object_id;
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult};

#[derive(Debug, Clone)]
pub struct RejectRequestCommand {
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestRejected {
    pub success: bool,
    pub request_id: String,
    pub status: RequestStatus,
}

pub struct RejectRequestUseCase {
    requests: Arc<dyn PromotionRequestRepository>,
}

impl RejectRequestUseCase {
    pub fn new(requests: Arc<dyn PromotionRequestRepository>) -> Self {
        Self { requests }
    }

    pub async fn execute(
        &self,
        command: RejectRequestCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<RequestRejected> {
        self.run(command, ctx).await.into()
    }

    async fn run(
        &self,
        command: RejectRequestCommand,
        ctx: ExecutionContext,
    ) -> Result<RequestRejected, UseCaseError> {
        let id = parse_object_id(&command.request_id)?;

        if !self.requests.set_status(&id, RequestStatus::Rejected).await? {
            return Err(UseCaseError::not_found_with_details(
                "REQUEST_NOT_FOUND",
                format!("Promotion request {} not found", command.request_id),
                details! { "requestId" => &command.request_id },
            ));
        }

        info!(request_id = %id, rejected_by = %ctx.principal_id, "Promotion request rejected");

        Ok(RequestRejected {
            success: true,
            request_id: id.to_hex(),
            status: RequestStatus::Rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use crate::promotion::entity::PromotionRequest;
    use crate::shared::in_memory::{InMemoryPromotionRequestRepository, InMemoryUserRepository};
    use crate::user::entity::{ContactDetails, User, UserRole};
    use crate::user::repository::UserRepository;

    #[tokio::test]
    async fn test_reject_leaves_user_role_unchanged() {
        let requests = Arc::new(InMemoryPromotionRequestRepository::new());
        let users = InMemoryUserRepository::new();
        users.insert(User::new("a@x.com")).unwrap();

        let id = requests
            .insert(&PromotionRequest::new(
                "A",
                "a@x.com",
                ContactDetails {
                    phone: "01700000000".into(),
                    division: "Dhaka".into(),
                    district: "Dhaka".into(),
                },
            ))
            .await
            .unwrap();

        let use_case = RejectRequestUseCase::new(requests.clone());
        use_case
            .execute(RejectRequestCommand { request_id: id.to_hex() }, ExecutionContext::create("admin@x.com"))
            .await
            .unwrap();

        let request = requests.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(request.status, RequestStatus::Rejected);
        assert!(request.rejected_at.is_some());

        let user = users.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(user.role(), Some(UserRole::Customer));
    }

    #[tokio::test]
    async fn test_unknown_request_is_not_found() {
        let use_case = RejectRequestUseCase::new(Arc::new(InMemoryPromotionRequestRepository::new()));
        let err = use_case
            .execute(RejectRequestCommand { request_id: ObjectId::new().to_hex() }, ExecutionContext::anonymous())
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 404);
    }
}
