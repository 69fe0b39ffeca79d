//! User repository trait, the minimal surface login needs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::User;
use crate::errors::DomainError;

/// Repository contract for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by login email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Stamp a successful login
    async fn update_last_login(&self, id: Uuid) -> Result<(), DomainError>;
}
