use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;

/// Time source shared by the issuer and the verifier.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// The identity a token asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
}

/// Represents the claims encoded within a JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject of the token.
    pub usuario: Subject,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiration, seconds since epoch.
    pub exp: i64,
}

/// The process-wide HS256 signing secret.
///
/// Constructed once at startup; an empty secret is rejected here so a
/// misconfigured process never gets as far as serving requests.
#[derive(Clone)]
pub struct TokenSecret {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSecret {
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        if secret.trim().is_empty() {
            return Err(AuthError::Signing("signing secret is empty".into()));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenSecret(<redacted>)")
    }
}

/// Creates signed, time-limited tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: TokenSecret,
    clock: SharedClock,
}

impl TokenIssuer {
    pub fn new(secret: TokenSecret, clock: SharedClock) -> Self {
        Self { secret, clock }
    }

    /// Signs a token for `subject` that expires `ttl` from now.
    pub fn issue(&self, subject: Uuid, ttl: Duration) -> Result<String, AuthError> {
        let iat = self.clock.utc().timestamp();
        let ttl = i64::try_from(ttl.as_secs())
            .map_err(|_| AuthError::Signing("token ttl out of range".into()))?;
        let claims = Claims {
            usuario: Subject { id: subject },
            iat,
            exp: iat.saturating_add(ttl),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.secret.encoding)
            .map_err(|e| AuthError::Signing(format!("Failed to generate token: {}", e)))
    }
}

/// Validates incoming tokens against the secret and the clock.
#[derive(Clone)]
pub struct TokenVerifier {
    secret: TokenSecret,
    clock: SharedClock,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: TokenSecret, clock: SharedClock) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is checked against the injected clock in `verify`
        validation.validate_exp = false;
        validation.leeway = 0;
        Self {
            secret,
            clock,
            validation,
        }
    }

    /// Checks signature and expiry, returning the subject's id.
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let claims = decode::<Claims>(token, &self.secret.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidToken,
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::MalformedToken,
            })?;

        if self.clock.utc().timestamp() >= claims.exp {
            return Err(AuthError::ExpiredToken);
        }
        Ok(claims.usuario.id)
    }
}
