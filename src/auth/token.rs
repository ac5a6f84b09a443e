//! Access token issuing and verification.
//!
//! Tokens are HMAC-signed JWTs. The signature is always checked before any
//! claim is looked at; expiry is then checked against the injected [`Clock`]
//! rather than the library's own wall-clock check, so tests can freeze time.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::TokenConfig;

/// Registered claims plus whatever extra claims the caller embeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims<C> {
    /// Subject - user id
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
    #[serde(flatten)]
    pub extra: C,
}

/// Extra claims carried by a login session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub is_admin: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
    #[error("token has expired")]
    Expired,
    #[error("token is invalid")]
    Invalid,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(config: &TokenConfig, clock: Arc<dyn Clock>) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: config.algorithm,
            ttl: Duration::minutes(config.expires_minutes),
            clock,
        }
    }

    /// Default lifetime of a session token.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue<C: Serialize>(
        &self,
        subject: &str,
        extra: C,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            extra,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(TokenError::Encoding)
    }

    pub fn verify<C: DeserializeOwned>(&self, token: &str) -> Result<Claims<C>, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims<C>>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("token rejected: {}", e);
            TokenError::Invalid
        })?;

        if self.clock.now().timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }

    pub fn issue_session(&self, user_id: i64, is_admin: bool) -> Result<String, TokenError> {
        self.issue(&user_id.to_string(), SessionClaims { is_admin }, self.ttl)
    }

    pub fn verify_session(&self, token: &str) -> Result<Claims<SessionClaims>, TokenError> {
        self.verify(token)
    }
}
