//! Request Promotion Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::details;
use crate::promotion::entity::{PromotionRequest, RequestStatus};
use crate::promotion::repository::PromotionRequestRepository;
use crate::shared::api_common::non_blank;
use crate::user::entity::ContactDetails;
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestPromotionCommand {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRequested {
    pub success: bool,
    pub inserted_id: String,
    pub status: RequestStatus,
}

pub struct RequestPromotionUseCase {
    requests: Arc<dyn PromotionRequestRepository>,
}

impl RequestPromotionUseCase {
    pub fn new(requests: Arc<dyn PromotionRequestRepository>) -> Self {
        Self { requests }
    }

    pub async fn execute(
        &self,
        command: RequestPromotionCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<PromotionRequested> {
        self.run(command, ctx).await.into()
    }

    async fn run(
        &self,
        command: RequestPromotionCommand,
        ctx: ExecutionContext,
    ) -> Result<PromotionRequested, UseCaseError> {
        let fields = [
            ("name", non_blank(command.name.as_deref())),
            ("email", non_blank(command.email.as_deref())),
            ("division", non_blank(command.division.as_deref())),
            ("district", non_blank(command.district.as_deref())),
            ("phone", non_blank(command.phone.as_deref())),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(field, _)| *field)
            .collect();
        let [Some(name), Some(email), Some(division), Some(district), Some(phone)] = fields.map(|(_, v)| v) else {
            return Err(UseCaseError::validation_with_details(
                "MISSING_FIELDS",
                format!("Missing required fields: {}", missing.join(", ")),
                details! { "missing" => missing },
            ));
        };

        // Business rule: one open request per email
        if let Some(existing) = self.requests.find_open_by_email(email).await? {
            return Err(UseCaseError::business_rule_with_details(
                "REQUEST_EXISTS",
                format!("A {} request for {} already exists", existing.status.as_str(), email),
                details! { "email" => email, "status" => existing.status.as_str() },
            ));
        }

        let request = PromotionRequest::new(
            name,
            email,
            ContactDetails {
                phone: phone.to_string(),
                division: division.to_string(),
                district: district.to_string(),
            },
        );
        let id = self.requests.insert(&request).await?;

        info!(
            request_id = %id,
            email = %email,
            execution_id = %ctx.execution_id,
            "Decorator promotion requested"
        );

        Ok(PromotionRequested {
            success: true,
            inserted_id: id.to_hex(),
            status: request.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::in_memory::InMemoryPromotionRequestRepository;

    fn command() -> RequestPromotionCommand {
        RequestPromotionCommand {
            name: Some("A".into()),
            email: Some("a@x.com".into()),
            division: Some("Dhaka".into()),
            district: Some("Dhaka".into()),
            phone: Some("01700000000".into()),
        }
    }

    #[tokio::test]
    async fn test_second_request_for_email_conflicts() {
        let use_case = RequestPromotionUseCase::new(Arc::new(InMemoryPromotionRequestRepository::new()));

        let first = use_case.execute(command(), ExecutionContext::anonymous()).await.unwrap();
        assert_eq!(first.status, RequestStatus::Pending);

        let err = use_case.execute(command(), ExecutionContext::anonymous()).await.unwrap_err();
        assert_eq!(err.code(), "REQUEST_EXISTS");
        assert_eq!(err.http_status_code(), 409);
    }

    #[tokio::test]
    async fn test_rejected_request_allows_a_new_one() {
        let requests = Arc::new(InMemoryPromotionRequestRepository::new());
        let use_case = RequestPromotionUseCase::new(requests.clone());

        let first = use_case.execute(command(), ExecutionContext::anonymous()).await.unwrap();
        let id = bson::oid::ObjectId::parse_str(&first.inserted_id).unwrap();
        requests.set_status(&id, RequestStatus::Rejected).await.unwrap();

        assert!(use_case.execute(command(), ExecutionContext::anonymous()).await.is_success());
    }

    #[tokio::test]
    async fn test_approved_request_blocks_new_one() {
        let requests = Arc::new(InMemoryPromotionRequestRepository::new());
        let use_case = RequestPromotionUseCase::new(requests.clone());

        let first = use_case.execute(command(), ExecutionContext::anonymous()).await.unwrap();
        let id = bson::oid::ObjectId::parse_str(&first.inserted_id).unwrap();
        requests.set_status(&id, RequestStatus::Approved).await.unwrap();

        let err = use_case.execute(command(), ExecutionContext::anonymous()).await.unwrap_err();
        assert_eq!(err.code(), "REQUEST_EXISTS");
        assert_eq!(err.http_status_code(), 409);
    }

    #[tokio::test]
    async fn test_missing_phone_is_a_validation_error() {
        let use_case = RequestPromotionUseCase::new(Arc::new(InMemoryPromotionRequestRepository::new()));
        let mut cmd = command();
        cmd.phone = Some(" ".into());

        let err = use_case.execute(cmd, ExecutionContext::anonymous()).await.unwrap_err();
        assert_eq!(err.code(), "MISSING_FIELDS");
        assert!(err.message().contains("phone"));
    }
}
