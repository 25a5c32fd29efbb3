//! Bearer token issuance and verification
//!
//! Tokens are stateless HS256 JWTs carrying the administrator's id and
//! username. Validity depends only on the signature and the expiry, so a
//! token cannot be revoked short of rotating `JWT_SECRET`.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::TokenError;

/// Default token lifetime: 12 hours
pub const DEFAULT_TOKEN_EXPIRY: u64 = 12 * 60 * 60;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret used to sign and verify tokens
    pub secret: String,
    /// Token lifetime in seconds
    pub expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Signing secret (required, must not be empty)
    /// - `JWT_EXPIRY_SECONDS`: Token lifetime in seconds (default: 43200)
    pub fn from_env() -> Result<Self, TokenError> {
        let secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                TokenError::Configuration("JWT_SECRET environment variable not set".to_string())
            })?;

        let expiry = std::env::var("JWT_EXPIRY_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_EXPIRY);

        Ok(JwtConfig { secret, expiry })
    }
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: i64,
    /// Username of the administrator
    pub username: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: u64,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self, TokenError> {
        if config.secret.is_empty() {
            return Err(TokenError::Configuration(
                "signing secret must not be empty".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(JwtService {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            expiry: config.expiry,
        })
    }

    /// Issue a token for a user, starting now
    pub fn issue_token(&self, user_id: i64, username: &str) -> Result<String, TokenError> {
        self.issue_token_at(user_id, username, unix_now())
    }

    /// Issue a token as if it had been issued at `issued_at` (unix seconds)
    pub fn issue_token_at(
        &self,
        user_id: i64,
        username: &str,
        issued_at: u64,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat: issued_at,
            exp: issued_at + self.expiry,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(TokenError::Invalid)?;
        Ok(token_data.claims)
    }

    /// Get the token lifetime in seconds
    pub fn expiry(&self) -> u64 {
        self.expiry
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    fn service(secret: &str) -> JwtService {
        JwtService::new(JwtConfig {
            secret: secret.to_string(),
            expiry: DEFAULT_TOKEN_EXPIRY,
        })
        .unwrap()
    }

    #[test]
    fn test_issue_and_validate() {
        let jwt = service("test-secret");
        let token = jwt.issue_token(7, "admin").unwrap();

        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_EXPIRY);
    }

    #[test]
    fn test_token_accepted_one_second_after_issue() {
        let jwt = service("test-secret");
        let token = jwt.issue_token_at(1, "admin", unix_now() - 1).unwrap();

        assert!(jwt.validate_token(&token).is_ok());
    }

    #[test]
    fn test_token_rejected_after_twelve_hours() {
        let jwt = service("test-secret");
        let issued_at = unix_now() - DEFAULT_TOKEN_EXPIRY - 1;
        let token = jwt.issue_token_at(1, "admin", issued_at).unwrap();

        let err = jwt.validate_token(&token).unwrap_err();
        match err {
            TokenError::Invalid(e) => assert!(matches!(e.kind(), ErrorKind::ExpiredSignature)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_numeric_subject_survives_validation() {
        let jwt = service("test-secret");
        let token = jwt.issue_token_at(42, "admin", unix_now() - 1).unwrap();

        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "admin");
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let token = service("secret-a").issue_token(1, "admin").unwrap();

        assert!(service("secret-b").validate_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let jwt = service("test-secret");
        assert!(jwt.validate_token("not.a.token").is_err());
        assert!(jwt.validate_token("").is_err());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = JwtService::new(JwtConfig {
            secret: String::new(),
            expiry: DEFAULT_TOKEN_EXPIRY,
        });
        assert!(matches!(result, Err(TokenError::Configuration(_))));
    }
}
