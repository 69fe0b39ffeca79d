//! Opaque credential-check primitive.
//!
//! Hashing policy lives behind this trait; the domain layer only ever
//! asks "does this password match this digest". The production
//! implementation (bcrypt) lives in the infra crate.

use crate::errors::DomainError;

/// Verifies a presented password against a stored digest
pub trait PasswordVerifier: Send + Sync {
    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, DomainError>;
}

/// Plain string comparison, for tests only
pub struct PlainTextPasswordVerifier;

impl PasswordVerifier for PlainTextPasswordVerifier {
    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, DomainError> {
        Ok(password == password_hash)
    }
}
