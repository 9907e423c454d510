//! Firebase ID token verification
//!
//! ID tokens are RS256 JWTs signed with Google's rotating securetoken keys.
//! A token is accepted when its `kid` resolves in the published JWKS, the
//! signature checks out, `iss` is `https://securetoken.google.com/<project>`,
//! `aud` is the project id, and `exp` lies in the future.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::auth::identity::{IdentityVerifier, VerifiedPrincipal};
use crate::shared::error::{PlatformError, Result};

const ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// JWKS (JSON Web Key Set)
#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
    pub keys: Vec<JwkKey>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwkKey {
    pub kty: String,
    pub kid: Option<String>,
    pub alg: Option<String>,
    pub n: Option<String>,
    pub e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

struct CachedKeys {
    jwks: Jwks,
    fetched_at: Instant,
}

#[derive(Debug, Deserialize)]
struct ServiceAccount {
    project_id: String,
}

/// Read `project_id` from a base64-encoded service account JSON
pub fn project_id_from_service_account(encoded: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| PlatformError::configuration(format!("Service account key is not base64: {}", e)))?;
    let account: ServiceAccount = serde_json::from_slice(&bytes)
        .map_err(|e| PlatformError::configuration(format!("Service account key is not valid JSON: {}", e)))?;
    if account.project_id.trim().is_empty() {
        return Err(PlatformError::configuration("Service account key has an empty project_id"));
    }
    Ok(account.project_id)
}

pub struct FirebaseTokenVerifier {
    http_client: reqwest::Client,
    project_id: String,
    jwks_url: String,
    cache_ttl: Duration,
    keys: RwLock<Option<CachedKeys>>,
}

impl FirebaseTokenVerifier {
    pub fn new(project_id: impl Into<String>, jwks_url: impl Into<String>, cache_ttl: Duration) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            project_id: project_id.into(),
            jwks_url: jwks_url.into(),
            cache_ttl,
            keys: RwLock::new(None),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    async fn fetch_jwks(&self) -> Result<Jwks> {
        info!(url = %self.jwks_url, "Fetching Firebase signing keys");
        self.http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| PlatformError::internal(format!("Failed to fetch JWKS: {}", e)))?
            .error_for_status()
            .map_err(|e| PlatformError::internal(format!("Failed to fetch JWKS: {}", e)))?
            .json()
            .await
            .map_err(|e| PlatformError::internal(format!("Failed to parse JWKS: {}", e)))
    }

    /// Cached key for `kid`; the set is refetched when stale or when the
    /// key is unknown (Google rotates keys every few hours)
    async fn key_for(&self, kid: &str) -> Result<JwkKey> {
        {
            let cache = self.keys.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.cache_ttl {
                    if let Some(key) = find_key(&cached.jwks, kid) {
                        return Ok(key);
                    }
                }
            }
        }

        let jwks = self.fetch_jwks().await?;
        let key = find_key(&jwks, kid);
        *self.keys.write().await = Some(CachedKeys {
            jwks,
            fetched_at: Instant::now(),
        });

        key.ok_or_else(|| PlatformError::invalid_token(format!("No signing key with kid {}", kid)))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[format!("{}{}", ISSUER_PREFIX, self.project_id)]);
        validation.set_audience(&[&self.project_id]);
        validation
    }
}

fn find_key(jwks: &Jwks, kid: &str) -> Option<JwkKey> {
    jwks.keys.iter().find(|k| k.kid.as_deref() == Some(kid)).cloned()
}

fn decoding_key(key: &JwkKey) -> Result<DecodingKey> {
    if key.kty != "RSA" {
        return Err(PlatformError::invalid_token(format!("Unsupported key type: {}", key.kty)));
    }
    let n = key.n.as_ref().ok_or_else(|| PlatformError::invalid_token("Missing 'n' in RSA key"))?;
    let e = key.e.as_ref().ok_or_else(|| PlatformError::invalid_token("Missing 'e' in RSA key"))?;
    DecodingKey::from_rsa_components(n, e)
        .map_err(|e| PlatformError::invalid_token(format!("Invalid RSA key: {}", e)))
}

#[async_trait]
impl IdentityVerifier for FirebaseTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedPrincipal> {
        let header = decode_header(token)
            .map_err(|e| PlatformError::invalid_token(format!("Invalid token header: {}", e)))?;
        if header.alg != Algorithm::RS256 {
            return Err(PlatformError::invalid_token(format!("Unexpected algorithm {:?}", header.alg)));
        }
        let kid = header
            .kid
            .ok_or_else(|| PlatformError::invalid_token("Token header has no kid"))?;

        let key = self.key_for(&kid).await?;
        let claims = decode::<FirebaseClaims>(token, &decoding_key(&key)?, &self.validation())
            .map_err(|e| PlatformError::invalid_token(e.to_string()))?
            .claims;

        if claims.sub.trim().is_empty() {
            return Err(PlatformError::invalid_token("Token has an empty subject"));
        }
        let email = claims
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| PlatformError::unauthorized("token carries no email"))?;

        debug!(uid = %claims.sub, "Verified Firebase ID token");
        Ok(VerifiedPrincipal {
            uid: claims.sub,
            email,
            name: claims.name,
        })
    }
}
