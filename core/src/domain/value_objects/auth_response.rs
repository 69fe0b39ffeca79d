//! Authentication response value objects.

use serde::{Deserialize, Serialize};

use crate::domain::entities::User;

/// Tokens handed to a client after login or rotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionTokens {
    /// Signed JWT access token
    pub access_token: String,

    /// Opaque refresh secret. `None` when the login carried no device
    /// info, in which case no refresh family was created.
    pub refresh_token: Option<String>,

    /// Access token expiration time in seconds
    pub expires_in: i64,
}

impl SessionTokens {
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in,
        }
    }
}

/// Result of a successful login: the authenticated user plus tokens.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub tokens: SessionTokens,
}
