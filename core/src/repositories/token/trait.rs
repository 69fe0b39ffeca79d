//! Token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::{RefreshToken, RevokedReason};
use crate::errors::DomainError;

/// Repository contract for refresh-token records.
///
/// The store is append-mostly: one row per issued-or-rotated token,
/// mutated only through status transitions. Rows are indexed by
/// `token_hash` (unique point lookup) and `(user_id, status)` (device
/// listing, bulk logout).
///
/// # Security Considerations
/// - Only SHA-256 digests of refresh secrets are ever stored
/// - Revoked and used rows are retained for audit, not deleted
/// - `rotate_active` is the rotation protocol's critical section and
///   must be atomic with respect to concurrent calls on the same row
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new refresh token record
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The saved record
    /// * `Err(DomainError)` - Save failed (e.g. duplicate token hash)
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token record by its hashed secret
    async fn find_by_hash(&self, token_hash: &str)
        -> Result<Option<RefreshToken>, DomainError>;

    /// Atomically consume an active record and insert its successor.
    ///
    /// In one transaction: transition the record identified by
    /// `token_id` from `active` to `used` (stamping `used_at`) and
    /// insert `successor`. The transition is conditional on the record
    /// still being `active`; when a concurrent rotation already consumed
    /// it, nothing is written and `Ok(false)` is returned. Exactly one
    /// of any set of concurrent callers observes `Ok(true)`.
    async fn rotate_active(
        &self,
        token_id: Uuid,
        used_at: DateTime<Utc>,
        successor: RefreshToken,
    ) -> Result<bool, DomainError>;

    /// Revoke every record in a family, regardless of status.
    ///
    /// Used for compromise cascades (reuse or theft verdicts). The call
    /// completes synchronously; by the time it returns no record in the
    /// family can rotate.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records newly revoked
    async fn revoke_family(
        &self,
        family_id: Uuid,
        reason: RevokedReason,
    ) -> Result<usize, DomainError>;

    /// Revoke the active record(s) bound to one device
    async fn revoke_device(
        &self,
        user_id: Uuid,
        device_id: &str,
        reason: RevokedReason,
    ) -> Result<usize, DomainError>;

    /// Revoke all active records for a user, optionally sparing one
    /// device
    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        except_device_id: Option<&str>,
        reason: RevokedReason,
    ) -> Result<usize, DomainError>;

    /// Find all active, unexpired records for a user, most recently used
    /// first
    async fn find_active_by_user(&self, user_id: Uuid)
        -> Result<Vec<RefreshToken>, DomainError>;

    /// Housekeeping: delete revoked or expired rows whose expiry is
    /// older than `cutoff`.
    ///
    /// Optional for correctness; expiry is always re-checked lazily at
    /// read time.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows deleted
    async fn delete_long_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError>;
}
