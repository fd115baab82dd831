//! Token issuing and password hashing.
//!
//! Tokens are HS256 JWTs carrying the player id, role and expiry. Passwords
//! are stored as `sha256$<salt_hex>$<digest_hex>` with a per-player salt.

use chrono::{DateTime, Duration, Utc};
use dungeons_domain::{PlayerId, Role};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Player id.
    pub sub: String,
    pub role: Role,
    /// Expiry timestamp (Unix seconds).
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    InvalidToken,
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Issues and verifies session tokens with a shared HS256 secret.
pub struct AuthTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl AuthTokens {
    pub fn new(secret: &str, token_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
        }
    }

    pub fn issue(
        &self,
        player_id: PlayerId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = TokenClaims {
            sub: player_id.to_string(),
            role,
            exp: (now + self.token_ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken,
            })
    }
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    use rand::Rng;

    let mut salt = [0u8; 16];
    rand::thread_rng().fill(&mut salt[..]);

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    format!("sha256${}${}", hex::encode(salt), hex::encode(digest))
}

/// Check a password against a stored `sha256$salt$digest` value.
///
/// Unknown formats verify as false rather than erroring, so a corrupt
/// hash locks the account instead of leaking details.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("sha256"), Some(salt_hex), Some(digest_hex), None) => {
            let Ok(salt) = hex::decode(salt_hex) else {
                return false;
            };
            let mut hasher = Sha256::new();
            hasher.update(&salt);
            hasher.update(password.as_bytes());
            hex::encode(hasher.finalize()) == digest_hex
        }
        _ => false,
    }
}
