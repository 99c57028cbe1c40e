// JWT bearer token issuance and validation

use crate::auth::{clock::Clock, error::AuthError, models::UserResponse};
use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lifetime of an issued bearer token
pub const TOKEN_TTL_SECONDS: i64 = 120;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub username: String,
    pub iat: i64, // issued at timestamp
    pub exp: i64, // expiration timestamp
}

impl From<Claims> for UserResponse {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            username: claims.username,
        }
    }
}

/// Validates a bearer token and yields its identity claims
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str) -> Result<Claims, AuthError>;
}

/// Token service for JWT operations (HS256)
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Create a TokenService signing with `secret`.
    /// Tokens expire [`TOKEN_TTL_SECONDS`] after issuance.
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(TOKEN_TTL_SECONDS),
            clock,
        }
    }

    /// Issue a token for the given identity
    pub fn issue(&self, user: &UserResponse) -> Result<String, AuthError> {
        let now = self.clock.now();

        let claims = Claims {
            id: user.id,
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }
}

impl TokenValidator for TokenService {
    fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        // Expiry is checked below against the injected clock
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::TokenInvalid)?;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::{MockClock, SystemClock};
    use proptest::prelude::*;

    fn alice() -> UserResponse {
        UserResponse {
            id: 1,
            username: "alice".to_string(),
        }
    }

    fn test_token_service() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes", Arc::new(SystemClock))
    }

    fn flip_signature_char(token: &str, offset: usize) -> String {
        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.as_bytes().to_vec();
        let idx = sig_start + offset;
        bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_token_expiration_is_2_minutes() {
        let service = test_token_service();
        let token = service.issue(&alice()).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 120);
    }

    #[test]
    fn test_token_claims_contain_user_identity() {
        let service = test_token_service();
        let token = service.issue(&alice()).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.id, 1);
        assert_eq!(claims.username, "alice");
        assert_eq!(UserResponse::from(claims), alice());
    }

    #[test]
    fn test_token_expires_after_window() {
        let clock = Arc::new(MockClock::new());
        let service = TokenService::new("secret", clock.clone());
        let token = service.issue(&alice()).unwrap();

        clock.advance(Duration::seconds(119));
        assert!(service.validate(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert!(matches!(service.validate(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_tampered_signature_is_invalid() {
        let service = test_token_service();
        let token = service.issue(&alice()).unwrap();

        for offset in [0, 5, 20] {
            let tampered = flip_signature_char(&token, offset);
            assert_ne!(tampered, token);
            assert!(matches!(service.validate(&tampered), Err(AuthError::TokenInvalid)));
        }
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let service = test_token_service();

        for token in ["", "not.a.token", "invalid_token_format"] {
            assert!(matches!(service.validate(token), Err(AuthError::TokenInvalid)));
        }
    }

    #[test]
    fn test_token_signature_verification() {
        let service1 = TokenService::new("secret1", Arc::new(SystemClock));
        let service2 = TokenService::new("secret2", Arc::new(SystemClock));

        let token = service1.issue(&alice()).unwrap();

        assert!(service1.validate(&token).is_ok());
        // Rotating the secret invalidates outstanding tokens
        assert!(matches!(service2.validate(&token), Err(AuthError::TokenInvalid)));
    }

    #[test]
    fn test_bad_signature_wins_over_expiry() {
        let clock = Arc::new(MockClock::new());
        let signer = TokenService::new("secret1", clock.clone());
        let other = TokenService::new("secret2", clock.clone());
        let token = signer.issue(&alice()).unwrap();

        clock.advance(Duration::minutes(10));
        assert!(matches!(other.validate(&token), Err(AuthError::TokenInvalid)));
        assert!(matches!(signer.validate(&token), Err(AuthError::TokenExpired)));
    }

    proptest! {
        #[test]
        fn prop_token_claims_contain_identity(
            id in 1i32..1000000,
            username in "[a-z][a-z0-9_]{2,15}"
        ) {
            let service = test_token_service();
            let user = UserResponse { id, username: username.clone() };
            let token = service.issue(&user)?;
            let claims = service.validate(&token)?;

            prop_assert_eq!(claims.id, id);
            prop_assert_eq!(claims.username, username);
            prop_assert_eq!(claims.exp - claims.iat, 120);
        }

        #[test]
        fn prop_malformed_tokens_rejected(malformed in "[a-zA-Z0-9]{10,50}") {
            let service = test_token_service();
            prop_assert!(service.validate(&malformed).is_err());
        }
    }
}
