//! JWT verification
//!
//! Tokens are issued elsewhere; this service only verifies them and reads
//! the subject. `create_token` exists for tooling and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret
    pub secret: String,
    /// Lifetime of tokens minted by `create_token`
    pub expiration_hours: i64,
    /// Expected `iss` claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            expiration_hours: 24,
            issuer: "rentcar-booking".to_string(),
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .field("issuer", &self.issuer)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Account id or username, resolved through the account directory
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
}

impl TokenClaims {
    pub fn new(subject: &str, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: subject.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

pub fn create_token(subject: &str, config: &JwtConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = TokenClaims::new(subject, config);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature, expiry and issuer, then return the claims
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies() {
        let config = JwtConfig::default();
        let token = create_token("acc-1", &config).unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "acc-1");
        assert!(!claims.is_expired());
    }

    #[test]
    fn wrong_secret_or_issuer_is_rejected() {
        let config = JwtConfig::default();
        let token = create_token("acc-1", &config).unwrap();

        let other_secret = JwtConfig {
            secret: "another-secret".into(),
            ..JwtConfig::default()
        };
        assert!(verify_token(&token, &other_secret).is_err());

        let other_issuer = JwtConfig {
            issuer: "someone-else".into(),
            ..JwtConfig::default()
        };
        assert!(verify_token(&token, &other_issuer).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = JwtConfig {
            expiration_hours: -2,
            ..JwtConfig::default()
        };
        let token = create_token("acc-1", &config).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }
}
