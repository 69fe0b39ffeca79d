//! User entity, minimal surface for the credential check at login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,

    /// Login email, unique
    pub email: String,

    /// Opaque credential digest; verified through `PasswordVerifier`,
    /// never inspected here
    pub password_hash: String,

    /// Display name shown to other travellers
    pub display_name: Option<String>,

    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,

    /// Last successful login
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a new user account
    pub fn new(email: String, password_hash: String, display_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            display_name,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user() {
        let user = User::new(
            "ana@example.com".to_string(),
            "$2b$12$abcdef".to_string(),
            Some("Ana".to_string()),
        );

        assert_eq!(user.email, "ana@example.com");
        assert!(user.last_login_at.is_none());
    }
}
