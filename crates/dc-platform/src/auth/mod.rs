//! Authentication & Authorization
//!
//! - `identity` - verifier trait and the static development verifier
//! - `firebase` - Firebase ID token verification against Google's JWKS
//! - `authorization_service` - role checks against the user record

pub mod identity;
pub mod firebase;
pub mod authorization_service;

pub use identity::{IdentityVerifier, StaticTokenVerifier, VerifiedPrincipal, extract_bearer_token};
pub use firebase::{FirebaseTokenVerifier, project_id_from_service_account};
pub use authorization_service::{AuthContext, AuthorizationService};
