//! Token authentication
//!
//! Users sign in through a separate service that hands the browser an HS256
//! JSON Web Token in the `token` cookie. This service only verifies it.

use chrono::{Duration, Utc};
use coursehub_core::UserId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use crate::error::ApiError;

pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing and verification keys derived from the shared secret
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Sign a token for `user` valid for `ttl`
    pub fn issue(&self, user: UserId, ttl: Duration) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(e.to_string()))
    }

    /// Check a token's signature and expiry and return its user
    pub fn verify(&self, token: &str) -> Result<UserId, ApiError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected token");
                ApiError::InvalidToken
            })?;

        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| ApiError::InvalidToken)
    }
}

/// The authenticated user behind a request's token cookie
pub fn current_user(cookies: &Cookies, keys: &TokenKeys) -> Result<UserId, ApiError> {
    let cookie = cookies.get(TOKEN_COOKIE).ok_or(ApiError::NotAuthenticated)?;
    keys.verify(cookie.value())
}
