//! Mock implementation of TokenRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::{RefreshToken, RevokedReason, TokenStatus};
use crate::errors::DomainError;

use super::r#trait::TokenRepository;

/// In-memory token repository for tests.
///
/// Keyed by `token_hash`. A single write guard covers the whole of
/// `rotate_active`, which gives it the same winner-takes-all semantics
/// as the transactional MySQL implementation.
pub struct MockTokenRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
}

impl MockTokenRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Snapshot every record in a family, test-inspection helper
    pub async fn family_records(&self, family_id: Uuid) -> Vec<RefreshToken> {
        let tokens = self.tokens.read().await;
        tokens
            .values()
            .filter(|t| t.family_id == family_id)
            .cloned()
            .collect()
    }
}

impl Default for MockTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token_hash) {
            return Err(DomainError::Validation {
                message: "Token hash already exists".to_string(),
            });
        }

        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn rotate_active(
        &self,
        token_id: Uuid,
        used_at: DateTime<Utc>,
        successor: RefreshToken,
    ) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&successor.token_hash) {
            return Err(DomainError::Validation {
                message: "Token hash already exists".to_string(),
            });
        }

        let Some(current) = tokens
            .values_mut()
            .find(|t| t.id == token_id && t.status == TokenStatus::Active)
        else {
            return Ok(false);
        };
        current.mark_used(used_at);

        tokens.insert(successor.token_hash.clone(), successor);
        Ok(true)
    }

    async fn revoke_family(
        &self,
        family_id: Uuid,
        reason: RevokedReason,
    ) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let now = Utc::now();
        let mut count = 0;

        for token in tokens.values_mut() {
            if token.family_id == family_id && token.status != TokenStatus::Revoked {
                token.revoke(reason, now);
                count += 1;
            }
        }

        Ok(count)
    }

    async fn revoke_device(
        &self,
        user_id: Uuid,
        device_id: &str,
        reason: RevokedReason,
    ) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let now = Utc::now();
        let mut count = 0;

        for token in tokens.values_mut() {
            if token.user_id == user_id
                && token.device_id == device_id
                && token.status == TokenStatus::Active
            {
                token.revoke(reason, now);
                count += 1;
            }
        }

        Ok(count)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        except_device_id: Option<&str>,
        reason: RevokedReason,
    ) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let now = Utc::now();
        let mut count = 0;

        for token in tokens.values_mut() {
            if token.user_id == user_id
                && token.status == TokenStatus::Active
                && except_device_id != Some(token.device_id.as_str())
            {
                token.revoke(reason, now);
                count += 1;
            }
        }

        Ok(count)
    }

    async fn find_active_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        let mut active: Vec<RefreshToken> = tokens
            .values()
            .filter(|t| t.user_id == user_id && t.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at));
        Ok(active)
    }

    async fn delete_long_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let initial_count = tokens.len();

        tokens.retain(|_, token| {
            !(token.expires_at < cutoff
                && matches!(token.status, TokenStatus::Revoked | TokenStatus::Used))
        });

        Ok(initial_count - tokens.len())
    }
}
