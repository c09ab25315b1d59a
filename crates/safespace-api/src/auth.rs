//! Password hashing, bearer tokens, and the request identity extractor.
//!
//! The pipeline for registration and login is:
//!
//! ```text
//! validate request -> hash / compare (blocking pool) -> issue token
//! ```
//!
//! bcrypt is CPU-bound, so [`PasswordHasher`] runs it on Tokio's blocking
//! pool. Tokens are HS256 JWTs carrying the user's ID as `userId`.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use safespace_types::UserId;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Legacy header some clients still send the token in.
pub const LEGACY_TOKEN_HEADER: &str = "x-auth-token";

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL_HOURS: u32 = 24;

/// Default bcrypt work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Errors from hashing or token handling.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// bcrypt failed (bad cost, corrupt stored hash).
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// Token signing failed.
    #[error("token signing failed: {0}")]
    Sign(jsonwebtoken::errors::Error),

    /// The presented token did not verify (bad signature, expired, garbled).
    #[error("{0}")]
    InvalidToken(String),

    /// The blocking hashing task did not complete.
    #[error("hashing task failed: {0}")]
    Task(String),
}

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// The authenticated user.
    pub user_id: UserId,
    /// Issued-at (seconds since the epoch).
    pub iat: i64,
    /// Expiry (seconds since the epoch).
    pub exp: i64,
}

/// Issues and verifies bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer signing with `secret`, issuing tokens that live for
    /// `ttl_hours`.
    pub fn new(secret: &str, ttl_hours: u32) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(i64::from(ttl_hours)),
        }
    }

    /// Issue a token for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Sign`] if the token cannot be encoded.
    pub fn issue(&self, user_id: UserId) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.ttl)
                .unwrap_or(now)
                .timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::Sign)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if the signature, algorithm or
    /// expiry check fails.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_hours", &self.ttl.num_hours())
            .finish_non_exhaustive()
    }
}

/// bcrypt hashing on the blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a hasher with the given bcrypt cost (4-31).
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Hash`] if bcrypt rejects the input or cost.
    pub async fn hash(&self, password: String) -> Result<String, AuthError> {
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AuthError::Task(e.to_string()))?
            .map_err(AuthError::from)
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Hash`] if the stored hash is not a valid bcrypt
    /// hash.
    pub async fn verify(&self, password: String, hash: String) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AuthError::Task(e.to_string()))?
            .map_err(AuthError::from)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

/// Pull the raw token out of `Authorization: Bearer ...` or the legacy
/// `x-auth-token` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        let token = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))
            .unwrap_or(value)
            .trim();
        if !token.is_empty() {
            return Some(token);
        }
    }
    headers
        .get(LEGACY_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The caller's identity, if a token was presented.
///
/// No token yields `Identity(None)`. A token that fails verification, or
/// whose user is no longer registered, is rejected with 401 rather than
/// silently treated as anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub Option<UserId>);

impl Identity {
    /// Require an authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when no token was presented.
    pub fn require(self) -> Result<UserId, ApiError> {
        self.0
            .ok_or_else(|| ApiError::Unauthorized(String::from("No token, authorization denied")))
    }
}

impl FromRequestParts<Arc<AppState>> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(Self(None));
        };
        let claims = state.tokens.verify(token)?;
        if state.store.find_user_by_id(claims.user_id).await?.is_none() {
            tracing::debug!(user_id = %claims.user_id, "Token names an unknown user");
            return Err(ApiError::Unauthorized(String::from(
                "Token user no longer exists",
            )));
        }
        Ok(Self(Some(claims.user_id)))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn issued_token_verifies_to_same_user() {
        let issuer = TokenIssuer::new("test-secret", DEFAULT_TOKEN_TTL_HOURS);
        let user_id = UserId::new();
        let claims = issuer
            .issue(user_id)
            .and_then(|token| issuer.verify(&token));
        assert_eq!(claims.map(|c| c.user_id).ok(), Some(user_id));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let ours = TokenIssuer::new("ours", DEFAULT_TOKEN_TTL_HOURS);
        let theirs = TokenIssuer::new("theirs", DEFAULT_TOKEN_TTL_HOURS);
        let token = theirs.issue(UserId::new()).unwrap_or_default();
        assert!(matches!(ours.verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = TokenIssuer::new("test-secret", 0);
        let stale = Claims {
            user_id: UserId::new(),
            iat: 0,
            exp: 1,
        };
        let token = jsonwebtoken::encode(&Header::default(), &stale, &issuer.encoding)
            .unwrap_or_default();
        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let issuer = TokenIssuer::new("test-secret", DEFAULT_TOKEN_TTL_HOURS);
        assert!(issuer.verify("not.a.token").is_err());
    }

    #[test]
    fn bearer_header_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(LEGACY_TOKEN_HEADER, HeaderValue::from_static("xyz"));
        assert_eq!(bearer_token(&headers), Some("abc"));
    }

    #[test]
    fn legacy_header_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(LEGACY_TOKEN_HEADER, HeaderValue::from_static(" xyz "));
        assert_eq!(bearer_token(&headers), Some("xyz"));
    }

    #[test]
    fn no_headers_means_no_token() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn missing_identity_is_unauthorized() {
        assert!(matches!(
            Identity(None).require(),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn hashed_password_verifies() {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash(String::from("hunter22")).await;
        assert!(hash.is_ok());
        let hash = hash.unwrap_or_default();
        assert_ne!(hash, "hunter22");

        let right = hasher.verify(String::from("hunter22"), hash.clone()).await;
        let wrong = hasher.verify(String::from("hunter23"), hash).await;
        assert!(right.is_ok_and(|ok| ok));
        assert!(wrong.is_ok_and(|ok| !ok));
    }
}
