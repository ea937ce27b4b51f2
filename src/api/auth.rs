//! Bearer-token authentication.
//!
//! The identity provider issues opaque signed session tokens of the form
//! `<account-id>.<hex HMAC-SHA256 of the account id>`, keyed with a secret
//! shared with this service. Every payment route requires one; the verifier
//! is injected into the router as an extension so the extractor works from
//! any handler without threading state types through it.

use crate::account::AccountId;
use crate::api::error::ApiError;
use crate::error::{Error, Result};
use crate::payment::signature;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::sync::Arc;

/// Validates session tokens against the shared auth secret.
pub struct TokenVerifier {
    secret: String,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Create a verifier for tokens signed with `secret`.
    #[must_use]
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Issue a token for an account. The identity provider does this in
    /// production; exposed here for tests and tooling.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the key cannot be initialized.
    pub fn issue(&self, account_id: &str) -> Result<String> {
        let mac = signature::mac_hex(&self.secret, account_id)?;
        Ok(format!("{account_id}.{mac}"))
    }

    /// Verify a token and extract the subject account id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] for malformed or forged tokens.
    pub fn verify(&self, token: &str) -> Result<AccountId> {
        let (account_id, mac) = token
            .rsplit_once('.')
            .ok_or_else(|| Error::Auth("malformed session token".to_string()))?;
        if account_id.is_empty() {
            return Err(Error::Auth("malformed session token".to_string()));
        }
        signature::verify_mac(&self.secret, account_id, mac)
            .map_err(|_| Error::Auth("invalid session token".to_string()))?;
        Ok(account_id.to_string())
    }
}

/// Extractor resolving the bearer token to the paying account.
#[derive(Debug, Clone)]
pub struct AuthAccount(pub AccountId);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let verifier = parts
            .extensions
            .get::<Arc<TokenVerifier>>()
            .ok_or_else(|| Error::Config("token verifier not installed".to_string()))?;

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::Auth("missing bearer token".to_string()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| Error::Auth("missing bearer token".to_string()))?;

        let account_id = verifier.verify(token)?;
        Ok(Self(account_id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_verify_round_trip() {
        let verifier = TokenVerifier::new("auth_secret".to_string());
        let token = verifier.issue("acct_42").unwrap();
        assert_eq!(verifier.verify(&token).unwrap(), "acct_42");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenVerifier::new("auth_secret".to_string());
        let other = TokenVerifier::new("other_secret".to_string());
        let token = issuer.issue("acct_42").unwrap();

        let err = other.verify(&token).unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn test_tampered_subject_rejected() {
        let verifier = TokenVerifier::new("auth_secret".to_string());
        let token = verifier.issue("acct_42").unwrap();
        let forged = token.replacen("acct_42", "acct_43", 1);

        assert!(verifier.verify(&forged).is_err());
    }

    #[test]
    fn test_malformed_token_rejected() {
        let verifier = TokenVerifier::new("auth_secret".to_string());
        assert!(verifier.verify("no-separator").is_err());
        assert!(verifier.verify(".deadbeef").is_err());
        assert!(verifier.verify("").is_err());
    }

    #[test]
    fn test_account_id_with_dots() {
        // Only the last separator splits subject from MAC.
        let verifier = TokenVerifier::new("auth_secret".to_string());
        let token = verifier.issue("user.name@example").unwrap();
        assert_eq!(verifier.verify(&token).unwrap(), "user.name@example");
    }

    #[test]
    fn test_debug_hides_secret() {
        let verifier = TokenVerifier::new("auth_secret".to_string());
        assert!(!format!("{verifier:?}").contains("auth_secret"));
    }
}
