use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use tm_core::domain::entities::{DeviceSession, User};
use tm_core::domain::entities::token::DeviceInfo;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 128))]
    pub device_id: Option<String>,
    #[validate(length(max = 128))]
    pub device_name: Option<String>,
    #[validate(length(max = 32))]
    pub platform: Option<String>,
}

impl LoginRequest {
    /// Device info, present only when the client identified itself
    pub fn device_info(&self) -> Option<DeviceInfo> {
        self.device_id.as_ref().map(|device_id| DeviceInfo {
            device_id: device_id.clone(),
            device_name: self.device_name.clone(),
            platform: self.platform.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
    #[validate(length(min = 1, max = 128))]
    pub device_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogoutRequest {
    #[validate(length(min = 1, max = 128))]
    pub device_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogoutAllRequest {
    /// Device to keep logged in, usually the caller's own
    #[validate(length(min = 1, max = 128))]
    pub except_device_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserDto,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
    pub revoked_sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSessionDto {
    pub device_id: String,
    pub device_name: Option<String>,
    pub platform: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_used_at: chrono::DateTime<chrono::Utc>,
}

impl From<&DeviceSession> for DeviceSessionDto {
    fn from(session: &DeviceSession) -> Self {
        Self {
            device_id: session.device_id.clone(),
            device_name: session.device_name.clone(),
            platform: session.platform.clone(),
            created_at: session.created_at,
            last_used_at: session.last_used_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceListResponse {
    pub devices: Vec<DeviceSessionDto>,
}
