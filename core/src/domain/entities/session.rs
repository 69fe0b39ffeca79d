//! Device session view derived from active refresh-token records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::token::RefreshToken;

/// One logged-in device, as shown in the session list.
///
/// Derived from the most recent active refresh-token record per
/// `(user_id, device_id)`; never carries secrets or hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSession {
    pub device_id: String,
    pub device_name: Option<String>,
    pub platform: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

impl From<&RefreshToken> for DeviceSession {
    fn from(token: &RefreshToken) -> Self {
        Self {
            device_id: token.device_id.clone(),
            device_name: token.device_name.clone(),
            platform: token.platform.clone(),
            created_at: token.created_at,
            last_used_at: token.last_used_at,
        }
    }
}
