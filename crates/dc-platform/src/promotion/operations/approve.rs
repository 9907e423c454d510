//! Approve Promotion Request Use Case
//!
//! Marks the request approved, then promotes the matching user. Approving an
//! already-approved request skips the first write and re-runs the second,
//! which is how a half-applied approval is finished.

use std::sync::Arc;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::details;
use crate::promotion::entity::RequestStatus;
use crate::promotion::repository::PromotionRequestRepository;
use crate::shared::api_common::parse_object_id;
use crate::shared::error::PlatformError;
use crate::user::repository::UserRepository;
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult, Workflow};

const MARK_APPROVED: &str = "mark request approved";
const PROMOTE_USER: &str = "promote user";

#[derive(Debug, Clone)]
pub struct ApproveRequestCommand {
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestApproved {
    pub success: bool,
    pub request_id: String,
    pub email: String,
    /// False when no user exists for the request email
    pub user_updated: bool,
    pub steps: Vec<String>,
}

pub struct ApproveRequestUseCase {
    requests: Arc<dyn PromotionRequestRepository>,
    users: Arc<dyn UserRepository>,
}

impl ApproveRequestUseCase {
    pub fn new(requests: Arc<dyn PromotionRequestRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { requests, users }
    }

    pub async fn execute(
        &self,
        command: ApproveRequestCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<RequestApproved> {
        self.run(command, ctx).await.into()
    }

    async fn run(
        &self,
        command: ApproveRequestCommand,
        ctx: ExecutionContext,
    ) -> Result<RequestApproved, UseCaseError> {
        let id = parse_object_id(&command.request_id)?;

        let request = self.requests.find_by_id(&id).await?.ok_or_else(|| {
            UseCaseError::not_found_with_details(
                "REQUEST_NOT_FOUND",
                format!("Promotion request {} not found", command.request_id),
                details! { "requestId" => &command.request_id },
            )
        })?;

        let mut workflow = Workflow::new("approve_promotion", &ctx);

        if request.status == RequestStatus::Approved {
            workflow.skip(MARK_APPROVED);
        } else {
            workflow
                .step(MARK_APPROVED, async {
                    match self.requests.set_status(&id, RequestStatus::Approved).await? {
                        true => Ok(()),
                        false => Err(PlatformError::not_found("Request", id.to_hex())),
                    }
                })
                .await?;
        }

        let contact = request.contact();
        let user_updated = workflow
            .step(PROMOTE_USER, self.users.promote_to_decorator(&request.email, &contact))
            .await?;

        if !user_updated {
            warn!(
                request_id = %id,
                email = %request.email,
                "Approved promotion request has no matching user"
            );
        }

        let steps = workflow.completed_steps().to_vec();
        workflow.finish();

        Ok(RequestApproved {
            success: true,
            request_id: id.to_hex(),
            email: request.email,
            user_updated,
            steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bson::oid::ObjectId;
    use crate::promotion::entity::PromotionRequest;
    use crate::shared::error::Result;
    use crate::shared::in_memory::{InMemoryPromotionRequestRepository, InMemoryUserRepository};
    use crate::user::entity::{ContactDetails, User, UserRole, WorkStatus};
    use crate::user::repository::LoginOutcome;

    async fn seed() -> (Arc<InMemoryPromotionRequestRepository>, Arc<InMemoryUserRepository>, ObjectId) {
        let requests = Arc::new(InMemoryPromotionRequestRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        users.insert(User::new("a@x.com")).unwrap();

        let request = PromotionRequest::new(
            "A",
            "a@x.com",
            ContactDetails {
                phone: "01700000000".into(),
                division: "Dhaka".into(),
                district: "Gazipur".into(),
            },
        );
        let id = requests.insert(&request).await.unwrap();
        (requests, users, id)
    }

    #[tokio::test]
    async fn test_approve_promotes_user() {
        let (requests, users, id) = seed().await;
        let use_case = ApproveRequestUseCase::new(requests.clone(), users.clone());

        let approved = use_case
            .execute(ApproveRequestCommand { request_id: id.to_hex() }, ExecutionContext::anonymous())
            .await
            .unwrap();
        assert!(approved.user_updated);

        let user = users.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(user.role(), Some(UserRole::Decorator));
        assert_eq!(user.work_status, Some(WorkStatus::Available));
        assert_eq!(user.district.as_deref(), Some("Gazipur"));
        assert_eq!(user.phone.as_deref(), Some("01700000000"));

        let request = requests.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(request.status, RequestStatus::Approved);
        assert!(request.approved_at.is_some());
    }

    #[tokio::test]
    async fn test_reapproving_skips_status_write() {
        let (requests, users, id) = seed().await;
        let use_case = ApproveRequestUseCase::new(requests, users);
        let command = || ApproveRequestCommand { request_id: id.to_hex() };

        use_case.execute(command(), ExecutionContext::anonymous()).await.unwrap();
        let again = use_case.execute(command(), ExecutionContext::anonymous()).await.unwrap();
        assert_eq!(again.steps, vec!["mark request approved (already applied)", "promote user"]);
    }

    #[tokio::test]
    async fn test_unknown_request_is_not_found() {
        let (requests, users, _) = seed().await;
        let use_case = ApproveRequestUseCase::new(requests, users);
        let err = use_case
            .execute(ApproveRequestCommand { request_id: ObjectId::new().to_hex() }, ExecutionContext::anonymous())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "REQUEST_NOT_FOUND");
    }

    struct UnavailableUsers;

    #[async_trait]
    impl UserRepository for UnavailableUsers {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>> {
            Ok(None)
        }
        async fn find_by_id(&self, _id: &ObjectId) -> Result<Option<User>> {
            Ok(None)
        }
        async fn find_all(&self) -> Result<Vec<User>> {
            Ok(Vec::new())
        }
        async fn find_decorators(&self, _division: Option<&str>, _district: Option<&str>) -> Result<Vec<User>> {
            Ok(Vec::new())
        }
        async fn record_login(&self, _user: &User, _logged_in_at: &str) -> Result<LoginOutcome> {
            Err(PlatformError::internal("store unavailable"))
        }
        async fn update_role(&self, _email: &str, _role: UserRole) -> Result<bool> {
            Err(PlatformError::internal("store unavailable"))
        }
        async fn set_work_status(&self, _id: &ObjectId, _status: WorkStatus) -> Result<bool> {
            Err(PlatformError::internal("store unavailable"))
        }
        async fn promote_to_decorator(&self, _email: &str, _contact: &ContactDetails) -> Result<bool> {
            Err(PlatformError::internal("store unavailable"))
        }
    }

    #[tokio::test]
    async fn test_user_write_failure_is_partial_then_recoverable() {
        let (requests, users, id) = seed().await;

        let failing = ApproveRequestUseCase::new(requests.clone(), Arc::new(UnavailableUsers));
        let err = failing
            .execute(ApproveRequestCommand { request_id: id.to_hex() }, ExecutionContext::anonymous())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PARTIAL_FAILURE");

        let healthy = ApproveRequestUseCase::new(requests, users.clone());
        healthy
            .execute(ApproveRequestCommand { request_id: id.to_hex() }, ExecutionContext::anonymous())
            .await
            .unwrap();
        let user = users.find_by_email("a@x.com").await.unwrap().unwrap();
        assert!(user.is_decorator());
    }
}
