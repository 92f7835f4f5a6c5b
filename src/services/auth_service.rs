//! Bearer token authentication.
//!
//! Turns the raw `Authorization` header value into the caller's
//! [`AccountId`]. Transport agnostic: handlers pass the header string in and
//! decide how to report the typed failure.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{Config, BEARER_TOKEN_PREFIX};
use crate::domain::AccountId;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

/// Reasons a bearer token could not be turned into an account identifier.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("authorization header is missing")]
    MissingHeader,

    #[error("authorization header is not a bearer token")]
    InvalidScheme,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Extracts the caller's account identifier from an `Authorization` value.
pub trait Authenticator: Send + Sync {
    fn extract_id(&self, authorization: Option<&str>) -> Result<AccountId, AuthError>;
}

/// HS256 JWT implementation of [`Authenticator`].
pub struct JwtAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration_hours: i64,
}

impl JwtAuthenticator {
    pub fn new(config: &Config) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret_bytes()),
            validation: Validation::default(),
            expiration_hours: config.jwt_expiration_hours,
        }
    }

    /// Mint a signed token whose subject is `id`.
    pub fn issue(&self, id: AccountId) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: id.into_inner(),
            exp: (now + Duration::hours(self.expiration_hours)).timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}

impl Authenticator for JwtAuthenticator {
    fn extract_id(&self, authorization: Option<&str>) -> Result<AccountId, AuthError> {
        let header = authorization.ok_or(AuthError::MissingHeader)?;
        let token = header
            .strip_prefix(BEARER_TOKEN_PREFIX)
            .ok_or(AuthError::InvalidScheme)?;

        let claims = self.decode(token.trim())?;
        Ok(AccountId::from(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator(secret: &str) -> JwtAuthenticator {
        JwtAuthenticator::new(&Config::with_secret(secret))
    }

    const SECRET: &str = "test-secret-key-for-testing-only-32chars";

    #[test]
    fn test_issued_token_round_trips() {
        let auth = authenticator(SECRET);
        let id = AccountId::new();
        let token = auth.issue(id).unwrap();

        let header = format!("Bearer {}", token);
        assert_eq!(auth.extract_id(Some(&header)).unwrap(), id);
    }

    #[test]
    fn test_missing_header() {
        let auth = authenticator(SECRET);
        assert!(matches!(auth.extract_id(None), Err(AuthError::MissingHeader)));
    }

    #[test]
    fn test_non_bearer_scheme() {
        let auth = authenticator(SECRET);
        let token = auth.issue(AccountId::new()).unwrap();
        let header = format!("Basic {}", token);
        assert!(matches!(
            auth.extract_id(Some(&header)),
            Err(AuthError::InvalidScheme)
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = authenticator("another-secret-key-that-is-32-chars!!");
        let token = issuer.issue(AccountId::new()).unwrap();

        let auth = authenticator(SECRET);
        let header = format!("Bearer {}", token);
        assert!(matches!(
            auth.extract_id(Some(&header)),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let past = Utc::now() - Duration::hours(2);
        let claims = Claims {
            sub: Uuid::new_v4(),
            exp: past.timestamp(),
            iat: (past - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let auth = authenticator(SECRET);
        let header = format!("Bearer {}", token);
        assert!(matches!(
            auth.extract_id(Some(&header)),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let auth = authenticator(SECRET);
        assert!(auth.extract_id(Some("Bearer not.a.jwt")).is_err());
    }
}
