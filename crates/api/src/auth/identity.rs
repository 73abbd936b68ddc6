//! Third-party identity verification for sign-in.
//!
//! The sign-in handler only sees the [`IdentityVerifier`] trait; production
//! uses [`GoogleTokenVerifier`], tests inject a fixed verifier.

use async_trait::async_trait;
use serde::Deserialize;
use swing_core::error::CoreError;

/// Identity asserted by a verified credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Stable provider-side user id.
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify `credential` and return the identity it asserts.
    ///
    /// Invalid or unverifiable credentials are [`CoreError::Unauthorized`].
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, CoreError>;
}

// ---------------------------------------------------------------------------
// Google
// ---------------------------------------------------------------------------

const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Verifies Google ID tokens with the `tokeninfo` endpoint.
pub struct GoogleTokenVerifier {
    client: reqwest::Client,
    client_id: Option<String>,
    endpoint: String,
}

/// Subset of the `tokeninfo` response. Google encodes booleans as strings.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: Option<String>,
    email_verified: Option<serde_json::Value>,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleTokenVerifier {
    /// `client_id` is the expected `aud`; the audience is not checked when
    /// `None`.
    pub fn new(client_id: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id,
            endpoint: GOOGLE_TOKENINFO_URL.to_string(),
        }
    }

    /// Point at a different `tokeninfo`-compatible endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn check(&self, info: TokenInfo) -> Result<VerifiedIdentity, CoreError> {
        if let Some(expected) = &self.client_id {
            if &info.aud != expected {
                return Err(CoreError::Unauthorized(
                    "Credential was issued for a different client".into(),
                ));
            }
        }

        let verified = match &info.email_verified {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s == "true",
            _ => false,
        };
        let email = info
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| CoreError::Unauthorized("Credential carries no email".into()))?;
        if !verified {
            return Err(CoreError::Unauthorized("Email address is not verified".into()));
        }

        Ok(VerifiedIdentity {
            subject: info.sub,
            email,
            name: info.name,
            picture: info.picture,
        })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleTokenVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, CoreError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("id_token", credential)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Identity provider unreachable");
                CoreError::Internal(format!("Identity provider unreachable: {e}"))
            })?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "Credential rejected by provider");
            return Err(CoreError::Unauthorized("Invalid credential".into()));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| CoreError::Internal(format!("Malformed tokeninfo response: {e}")))?;
        self.check(info)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn info(value: serde_json::Value) -> TokenInfo {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn accepts_verified_string_flag() {
        let verifier = GoogleTokenVerifier::new(Some("client-1".into()));
        let identity = verifier
            .check(info(json!({
                "aud": "client-1",
                "sub": "g-123",
                "email": "ava@test.com",
                "email_verified": "true",
                "name": "Ava",
            })))
            .unwrap();
        assert_eq!(identity.subject, "g-123");
        assert_eq!(identity.name.as_deref(), Some("Ava"));
    }

    #[test]
    fn rejects_wrong_audience() {
        let verifier = GoogleTokenVerifier::new(Some("client-1".into()));
        let result = verifier.check(info(json!({
            "aud": "someone-else",
            "sub": "g-123",
            "email": "ava@test.com",
            "email_verified": true,
        })));
        assert!(matches!(result, Err(CoreError::Unauthorized(_))));
    }

    #[test]
    fn rejects_unverified_email() {
        let verifier = GoogleTokenVerifier::new(None);
        let result = verifier.check(info(json!({
            "aud": "any",
            "sub": "g-123",
            "email": "ava@test.com",
            "email_verified": "false",
        })));
        assert!(result.is_err());
    }
}
