//! Token entities for the session/identity subsystem.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token expiration time (15 minutes)
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Refresh token expiration time (30 days)
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

/// Claim value identifying an access token
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// Claims structure for the access-token JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Device the token was issued to, if the login was device-bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,

    /// Token type discriminator, always `"access"` for valid tokens
    pub token_type: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

impl AccessClaims {
    /// Creates new claims for an access token
    pub fn new(user_id: Uuid, device_id: Option<String>, expiry_minutes: i64) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::minutes(expiry_minutes);

        Self {
            sub: user_id.to_string(),
            device_id,
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

/// Lifecycle status of a persisted refresh-token record.
///
/// Transitions are monotone: `Active -> Used`, `Active -> Revoked`, and
/// `Used -> Revoked` are legal; `Revoked` is terminal and nothing ever
/// returns to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    Active,
    Used,
    Revoked,
}

impl TokenStatus {
    /// Database/string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStatus::Active => "active",
            TokenStatus::Used => "used",
            TokenStatus::Revoked => "revoked",
        }
    }

    /// Parse from the database representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(TokenStatus::Active),
            "used" => Some(TokenStatus::Used),
            "revoked" => Some(TokenStatus::Revoked),
            _ => None,
        }
    }
}

/// Why a refresh-token record was revoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevokedReason {
    /// Single-device logout requested by the user
    Logout,
    /// Multi-device logout requested by the user
    LogoutAll,
    /// An already-rotated token was presented again
    ReuseDetected,
    /// A token was presented by a device other than the one it was issued to
    DeviceMismatch,
}

impl RevokedReason {
    /// Database/string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RevokedReason::Logout => "logout",
            RevokedReason::LogoutAll => "logout_all",
            RevokedReason::ReuseDetected => "reuse_detected",
            RevokedReason::DeviceMismatch => "device_mismatch",
        }
    }

    /// Parse from the database representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "logout" => Some(RevokedReason::Logout),
            "logout_all" => Some(RevokedReason::LogoutAll),
            "reuse_detected" => Some(RevokedReason::ReuseDetected),
            "device_mismatch" => Some(RevokedReason::DeviceMismatch),
            _ => None,
        }
    }
}

/// Device metadata supplied at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_id: String,
    pub device_name: Option<String>,
    pub platform: Option<String>,
}

/// Refresh token record persisted in the database.
///
/// One row per issued-or-rotated token. Records are never edited after
/// creation except through status transitions (`used_at`, `revoked_at`,
/// `revoked_reason`, `last_used_at`); revoked and expired rows are kept
/// for audit rather than deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique identifier for this record
    pub id: Uuid,

    /// User this token belongs to
    pub user_id: Uuid,

    /// Device this token is bound to
    pub device_id: String,

    /// Human-readable device name, if the client reported one
    pub device_name: Option<String>,

    /// Client platform ("ios", "android", "web", ...)
    pub platform: Option<String>,

    /// SHA-256 digest of the opaque secret handed to the client.
    /// The secret itself is never stored.
    pub token_hash: String,

    /// Rotation-chain lineage: every token descended from one login
    /// event shares this ID
    pub family_id: Uuid,

    /// Lifecycle status
    pub status: TokenStatus,

    /// Timestamp when the record was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// When the token was consumed by a successful rotation
    pub used_at: Option<DateTime<Utc>>,

    /// When the token was revoked
    pub revoked_at: Option<DateTime<Utc>>,

    /// Why the token was revoked
    pub revoked_reason: Option<RevokedReason>,

    /// Last time this record was touched by a login or rotation
    pub last_used_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Creates the root record of a brand-new token family.
    ///
    /// Called at login: the record starts `Active` with a fresh
    /// `family_id` of its own.
    pub fn family_root(
        user_id: Uuid,
        device: DeviceInfo,
        token_hash: String,
        expiry_days: i64,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            user_id,
            device_id: device.device_id,
            device_name: device.device_name,
            platform: device.platform,
            token_hash,
            family_id: Uuid::new_v4(),
            status: TokenStatus::Active,
            created_at: now,
            expires_at: now + Duration::days(expiry_days),
            used_at: None,
            revoked_at: None,
            revoked_reason: None,
            last_used_at: now,
        }
    }

    /// Creates the successor record for a rotation.
    ///
    /// Same user, device, and family as `self`; fresh id, hash, and
    /// expiry window.
    pub fn successor(&self, token_hash: String, expiry_days: i64) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            device_id: self.device_id.clone(),
            device_name: self.device_name.clone(),
            platform: self.platform.clone(),
            token_hash,
            family_id: self.family_id,
            status: TokenStatus::Active,
            created_at: now,
            expires_at: now + Duration::days(expiry_days),
            used_at: None,
            revoked_at: None,
            revoked_reason: None,
            last_used_at: now,
        }
    }

    /// Checks if the token has expired.
    ///
    /// Expiry is evaluated lazily at read time; there is no explicit
    /// `Expired` status.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Checks whether this record is the live tip of its rotation chain
    pub fn is_active(&self) -> bool {
        self.status == TokenStatus::Active && !self.is_expired()
    }

    /// Consumes the token as part of a successful rotation:
    /// `Active -> Used`
    pub fn mark_used(&mut self, at: DateTime<Utc>) {
        self.status = TokenStatus::Used;
        self.used_at = Some(at);
        self.last_used_at = at;
    }

    /// Revokes the token: `Active|Used -> Revoked`.
    ///
    /// Idempotent; an already-revoked record keeps its original reason.
    pub fn revoke(&mut self, reason: RevokedReason, at: DateTime<Utc>) {
        if self.status == TokenStatus::Revoked {
            return;
        }
        self.status = TokenStatus::Revoked;
        self.revoked_at = Some(at);
        self.revoked_reason = Some(reason);
    }
}
