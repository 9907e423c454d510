//! Identity verification
//!
//! Bearer tokens are issued by an external identity provider; the platform
//! only verifies them and reads the caller's uid and email.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::shared::error::{PlatformError, Result};

/// Identity established from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPrincipal {
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Fails with `Unauthorized` or `InvalidToken`
    async fn verify(&self, token: &str) -> Result<VerifiedPrincipal>;
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Fixed token to email table for development and tests
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new<I, K, V>(tokens: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|(token, email)| (token.into(), email.into()))
                .collect(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedPrincipal> {
        let email = self
            .tokens
            .get(token)
            .ok_or_else(|| PlatformError::unauthorized("unknown token"))?;
        Ok(VerifiedPrincipal {
            uid: format!("static:{}", email),
            email: email.clone(),
            name: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[tokio::test]
    async fn test_static_verifier() {
        let verifier = StaticTokenVerifier::new([("t-admin", "admin@example.com")]);
        let principal = verifier.verify("t-admin").await.unwrap();
        assert_eq!(principal.email, "admin@example.com");

        let err = verifier.verify("nope").await.unwrap_err();
        assert!(matches!(err, PlatformError::Unauthorized { .. }));
    }
}
