//! Bcrypt-backed password verification.

use tm_core::errors::DomainError;
use tm_core::services::auth::PasswordVerifier;

/// Verifies passwords against bcrypt digests
pub struct BcryptPasswordVerifier;

impl BcryptPasswordVerifier {
    /// Hash a password for storage.
    ///
    /// Used by account provisioning, not by the login path.
    pub fn hash(password: &str) -> Result<String, DomainError> {
        bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| DomainError::Internal {
            message: format!("Failed to hash password: {}", e),
        })
    }
}

impl PasswordVerifier for BcryptPasswordVerifier {
    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, DomainError> {
        bcrypt::verify(password, password_hash).map_err(|e| DomainError::Internal {
            message: format!("Failed to verify password: {}", e),
        })
    }
}
