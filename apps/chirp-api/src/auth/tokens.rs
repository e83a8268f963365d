//! Bearer credential verification for the handshake and HTTP routes.
//!
//! Credentials are HMAC-signed JWTs minted by the (external) login flow;
//! the claims carry the identity id and an expiry.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Default credential lifetime when minting (1 hour).
pub const TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Identity id the credential was issued to.
    pub sub: String,
    /// Expiry as a Unix timestamp.
    pub exp: i64,
}

/// Mint a credential for `user_id`. Used by the login collaborator and by
/// tests.
pub fn issue(secret: &str, user_id: &str, ttl_secs: i64) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: Utc::now().timestamp() + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| ApiError::internal("failed to sign token"))
}

/// Verify a credential and extract the identity id.
///
/// Expired, malformed, or mis-signed tokens all map to the same
/// authentication error; the caller learns nothing beyond "invalid".
pub fn verify(secret: &str, token: &str) -> Result<String, ApiError> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;
    Ok(data.claims.sub)
}
