//! JWT authentication.
//!
//! Every `/api` request carries a bearer token whose claims name the store
//! it operates on. Handlers never take a store identifier from the request
//! body or URL; the [`StoreContext`] extractor is the only source, so a
//! client cannot sell against another store's register.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (operator identifier).
    pub sub: String,

    /// Store this token grants access to.
    pub store_id: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration (Unix timestamp).
    pub exp: i64,

    /// JWT ID (unique identifier for this token).
    pub jti: String,
}

/// Verifies and mints store-scoped tokens.
#[derive(Clone)]
pub struct AuthVerifier {
    secret: String,
    lifetime_secs: i64,
}

impl AuthVerifier {
    /// Create a new verifier.
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        AuthVerifier {
            secret: secret.into(),
            lifetime_secs,
        }
    }

    /// Mint a token scoped to a store.
    pub fn issue(&self, operator: &str, store_id: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: operator.to_string(),
            store_id: store_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("failed to generate token: {e}")))
    }

    /// Validate and decode a token.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| ApiError::unauthorized(format!("invalid token: {e}")))?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from an authorization header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

// =============================================================================
// Store Context Extractor
// =============================================================================

/// The authenticated store a request operates on.
///
/// Extracted from the bearer token; a missing or invalid token rejects the
/// request with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct StoreContext {
    pub store_id: String,
    pub operator: String,
}

#[async_trait]
impl FromRequestParts<AppState> for StoreContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("expected bearer token"))?;

        let claims = state.auth.verify(token)?;

        Ok(StoreContext {
            store_id: claims.store_id,
            operator: claims.sub,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
