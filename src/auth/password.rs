// Password hashing and verification service

use crate::auth::error::AuthError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Argon2 work factor, read from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    /// Number of passes over memory (`HASH_COST`)
    pub iterations: u32,
    /// Memory size in KiB (`HASH_MEMORY_KIB`)
    pub memory_kib: u32,
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            iterations: Params::DEFAULT_T_COST,
            memory_kib: Params::DEFAULT_M_COST,
        }
    }
}

/// Password service for hashing and verification.
///
/// Both operations are CPU bound; async callers should go through
/// [`PasswordService::hash_blocking`] and [`PasswordService::verify_blocking`],
/// which run on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct PasswordService {
    params: Params,
}

impl PasswordService {
    pub fn new(cost: HashingCost) -> Result<Self, AuthError> {
        let params = Params::new(cost.memory_kib, cost.iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| AuthError::PasswordHashError(format!("Invalid hashing cost: {}", e)))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password using Argon2id, returning a PHC string
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// The cost parameters embedded in the hash are used, so hashes created
    /// under an older cost setting keep verifying.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AuthError::PasswordHashError(format!("Invalid stored hash: {}", e)))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::PasswordHashError(e.to_string())),
        }
    }

    pub async fn hash_blocking(&self, password: String) -> Result<String, AuthError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.hash_password(&password))
            .await
            .map_err(|e| AuthError::PasswordHashError(format!("Hashing task failed: {}", e)))?
    }

    pub async fn verify_blocking(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::PasswordHashError(format!("Verification task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_service() -> PasswordService {
        PasswordService::new(HashingCost {
            iterations: 1,
            memory_kib: 1024,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_is_salted_phc_string() {
        let service = cheap_service();
        let first = service.hash_password("pw123").unwrap();
        let second = service.hash_password("pw123").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second, "each hash should use a fresh salt");
    }

    #[test]
    fn test_verify_matches_and_mismatches() {
        let service = cheap_service();
        let hash = service.hash_password("pw123").unwrap();

        assert!(service.verify_password("pw123", &hash).unwrap());
        assert!(!service.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_empty_password_still_hashes() {
        let service = cheap_service();
        let hash = service.hash_password("").unwrap();
        assert!(service.verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_cost_is_taken_from_configuration() {
        let service = PasswordService::new(HashingCost {
            iterations: 3,
            memory_kib: 2048,
        })
        .unwrap();
        let hash = service.hash_password("pw").unwrap();
        assert!(hash.contains("m=2048,t=3"));

        // A hash made under another cost still verifies
        assert!(cheap_service().verify_password("pw", &hash).unwrap());
    }

    #[test]
    fn test_invalid_cost_is_rejected() {
        let result = PasswordService::new(HashingCost {
            iterations: 0,
            memory_kib: 1024,
        });
        assert!(matches!(result, Err(AuthError::PasswordHashError(_))));
    }

    #[test]
    fn test_malformed_hash_is_an_error_not_a_mismatch() {
        let service = cheap_service();
        let result = service.verify_password("pw", "not-a-phc-string");
        assert!(matches!(result, Err(AuthError::PasswordHashError(_))));
    }

    #[tokio::test]
    async fn test_blocking_helpers_round_trip() {
        let service = cheap_service();
        let hash = service.hash_blocking("pw123".to_string()).await.unwrap();
        assert!(service
            .verify_blocking("pw123".to_string(), hash)
            .await
            .unwrap());
    }
}
