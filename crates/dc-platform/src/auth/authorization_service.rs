//! Authorization Service
//!
//! Roles live on the user document, not in the token, so privileged routes
//! look the caller up by the email the verified token carries.

use std::sync::Arc;
use tracing::debug;

use crate::auth::identity::VerifiedPrincipal;
use crate::shared::error::{PlatformError, Result};
use crate::user::entity::UserRole;
use crate::user::repository::UserRepository;

/// Authorization context for a request
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Identity provider uid
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
}

impl From<VerifiedPrincipal> for AuthContext {
    fn from(principal: VerifiedPrincipal) -> Self {
        Self {
            uid: principal.uid,
            email: principal.email,
            name: principal.name,
        }
    }
}

pub struct AuthorizationService {
    users: Arc<dyn UserRepository>,
}

impl AuthorizationService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Stored role of the caller; `None` when the caller has no user record
    /// or the stored value is not a known role
    pub async fn role_of(&self, context: &AuthContext) -> Result<Option<UserRole>> {
        let user = self.users.find_by_email(&context.email).await?;
        Ok(user.and_then(|u| u.role()))
    }

    pub async fn require_role(&self, context: &AuthContext, role: UserRole) -> Result<()> {
        match self.role_of(context).await? {
            Some(actual) if actual == role => Ok(()),
            actual => {
                debug!(email = %context.email, ?actual, required = role.as_str(), "Role check failed");
                Err(PlatformError::forbidden(format!("{} role required", role.as_str())))
            }
        }
    }

    pub async fn require_admin(&self, context: &AuthContext) -> Result<()> {
        self.require_role(context, UserRole::Admin).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::in_memory::InMemoryUserRepository;
    use crate::user::entity::User;

    fn context(email: &str) -> AuthContext {
        AuthContext {
            uid: "uid".into(),
            email: email.into(),
            name: None,
        }
    }

    fn service() -> AuthorizationService {
        let users = InMemoryUserRepository::new();
        users.insert(User::new("admin@example.com").with_role(UserRole::Admin)).unwrap();
        users.insert(User::new("c@example.com")).unwrap();
        AuthorizationService::new(Arc::new(users))
    }

    #[tokio::test]
    async fn test_admin_passes() {
        assert!(service().require_admin(&context("admin@example.com")).await.is_ok());
    }

    #[tokio::test]
    async fn test_customer_is_forbidden() {
        let err = service().require_admin(&context("c@example.com")).await.unwrap_err();
        assert!(matches!(err, PlatformError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_unknown_user_is_forbidden() {
        let svc = service();
        assert_eq!(svc.role_of(&context("ghost@example.com")).await.unwrap(), None);
        assert!(svc.require_admin(&context("ghost@example.com")).await.is_err());
    }
}
