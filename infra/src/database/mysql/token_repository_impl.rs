//! MySQL implementation of the TokenRepository trait.
//!
//! One row per issued-or-rotated refresh token. The table carries a
//! unique index on `token_hash` and a composite index on
//! `(user_id, status)` for device listing and bulk logout.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use tm_core::domain::entities::token::{RefreshToken, RevokedReason, TokenStatus};
use tm_core::errors::DomainError;
use tm_core::repositories::TokenRepository;

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a RefreshToken entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<RefreshToken, DomainError> {
        let id: String = row.try_get("id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get id: {}", e),
        })?;
        let user_id: String = row.try_get("user_id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get user_id: {}", e),
        })?;
        let family_id: String = row
            .try_get("family_id")
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to get family_id: {}", e),
            })?;
        let status: String = row.try_get("status").map_err(|e| DomainError::Internal {
            message: format!("Failed to get status: {}", e),
        })?;
        let revoked_reason: Option<String> =
            row.try_get("revoked_reason")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get revoked_reason: {}", e),
                })?;

        Ok(RefreshToken {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid token UUID: {}", e),
            })?,
            user_id: Uuid::parse_str(&user_id).map_err(|e| DomainError::Internal {
                message: format!("Invalid user UUID: {}", e),
            })?,
            device_id: row
                .try_get("device_id")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get device_id: {}", e),
                })?,
            device_name: row
                .try_get("device_name")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get device_name: {}", e),
                })?,
            platform: row.try_get("platform").map_err(|e| DomainError::Internal {
                message: format!("Failed to get platform: {}", e),
            })?,
            token_hash: row
                .try_get("token_hash")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get token_hash: {}", e),
                })?,
            family_id: Uuid::parse_str(&family_id).map_err(|e| DomainError::Internal {
                message: format!("Invalid family UUID: {}", e),
            })?,
            status: TokenStatus::parse(&status).ok_or_else(|| DomainError::Internal {
                message: format!("Unknown token status: {}", status),
            })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                })?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get expires_at: {}", e),
                })?,
            used_at: row
                .try_get::<Option<DateTime<Utc>>, _>("used_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get used_at: {}", e),
                })?,
            revoked_at: row
                .try_get::<Option<DateTime<Utc>>, _>("revoked_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get revoked_at: {}", e),
                })?,
            revoked_reason: match revoked_reason {
                Some(reason) => {
                    Some(
                        RevokedReason::parse(&reason).ok_or_else(|| DomainError::Internal {
                            message: format!("Unknown revoked reason: {}", reason),
                        })?,
                    )
                }
                None => None,
            },
            last_used_at: row
                .try_get::<DateTime<Utc>, _>("last_used_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get last_used_at: {}", e),
                })?,
        })
    }
}

const TOKEN_COLUMNS: &str = "id, user_id, device_id, device_name, platform, token_hash, \
     family_id, status, created_at, expires_at, used_at, revoked_at, revoked_reason, \
     last_used_at";

const INSERT_TOKEN: &str = "INSERT INTO refresh_tokens (\
     id, user_id, device_id, device_name, platform, token_hash, family_id, status, \
     created_at, expires_at, used_at, revoked_at, revoked_reason, last_used_at\
     ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// Binds every column of `token` to an insert statement
fn bind_token<'q>(
    query: sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments>,
    token: &'q RefreshToken,
) -> sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments> {
    query
        .bind(token.id.to_string())
        .bind(token.user_id.to_string())
        .bind(&token.device_id)
        .bind(&token.device_name)
        .bind(&token.platform)
        .bind(&token.token_hash)
        .bind(token.family_id.to_string())
        .bind(token.status.as_str())
        .bind(token.created_at)
        .bind(token.expires_at)
        .bind(token.used_at)
        .bind(token.revoked_at)
        .bind(token.revoked_reason.map(|r| r.as_str()))
        .bind(token.last_used_at)
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        bind_token(sqlx::query(INSERT_TOKEN), &token)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    DomainError::Validation {
                        message: "Token hash already exists".to_string(),
                    }
                }
                _ => DomainError::Internal {
                    message: format!("Failed to save refresh token: {}", e),
                },
            })?;

        Ok(token)
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, DomainError> {
        let query = format!(
            "SELECT {} FROM refresh_tokens WHERE token_hash = ? LIMIT 1",
            TOKEN_COLUMNS
        );

        let result = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find refresh token: {}", e),
            })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }

    async fn rotate_active(
        &self,
        token_id: Uuid,
        used_at: DateTime<Utc>,
        successor: RefreshToken,
    ) -> Result<bool, DomainError> {
        // The rotation critical section: the conditional Active -> Used
        // transition and the successor insert commit together or not at
        // all. The status guard in the WHERE clause makes concurrent
        // rotations on one row mutually exclusive.
        let mut tx = self.pool.begin().await.map_err(|e| DomainError::Internal {
            message: format!("Failed to begin rotation transaction: {}", e),
        })?;

        let updated = sqlx::query(
            "UPDATE refresh_tokens \
             SET status = 'used', used_at = ?, last_used_at = ? \
             WHERE id = ? AND status = 'active'",
        )
        .bind(used_at)
        .bind(used_at)
        .bind(token_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Failed to consume refresh token: {}", e),
        })?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.map_err(|e| DomainError::Internal {
                message: format!("Failed to roll back rotation: {}", e),
            })?;
            return Ok(false);
        }

        bind_token(sqlx::query(INSERT_TOKEN), &successor)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to insert successor token: {}", e),
            })?;

        tx.commit().await.map_err(|e| DomainError::Internal {
            message: format!("Failed to commit rotation: {}", e),
        })?;

        Ok(true)
    }

    async fn revoke_family(
        &self,
        family_id: Uuid,
        reason: RevokedReason,
    ) -> Result<usize, DomainError> {
        // Any status except already-revoked: a compromise verdict kills
        // used and active rows alike.
        let result = sqlx::query(
            "UPDATE refresh_tokens \
             SET status = 'revoked', revoked_at = ?, revoked_reason = ? \
             WHERE family_id = ? AND status != 'revoked'",
        )
        .bind(Utc::now())
        .bind(reason.as_str())
        .bind(family_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Failed to revoke token family: {}", e),
        })?;

        Ok(result.rows_affected() as usize)
    }

    async fn revoke_device(
        &self,
        user_id: Uuid,
        device_id: &str,
        reason: RevokedReason,
    ) -> Result<usize, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens \
             SET status = 'revoked', revoked_at = ?, revoked_reason = ? \
             WHERE user_id = ? AND device_id = ? AND status = 'active'",
        )
        .bind(Utc::now())
        .bind(reason.as_str())
        .bind(user_id.to_string())
        .bind(device_id)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Failed to revoke device tokens: {}", e),
        })?;

        Ok(result.rows_affected() as usize)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        except_device_id: Option<&str>,
        reason: RevokedReason,
    ) -> Result<usize, DomainError> {
        let result = match except_device_id {
            Some(device_id) => {
                sqlx::query(
                    "UPDATE refresh_tokens \
                     SET status = 'revoked', revoked_at = ?, revoked_reason = ? \
                     WHERE user_id = ? AND device_id != ? AND status = 'active'",
                )
                .bind(Utc::now())
                .bind(reason.as_str())
                .bind(user_id.to_string())
                .bind(device_id)
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "UPDATE refresh_tokens \
                     SET status = 'revoked', revoked_at = ?, revoked_reason = ? \
                     WHERE user_id = ? AND status = 'active'",
                )
                .bind(Utc::now())
                .bind(reason.as_str())
                .bind(user_id.to_string())
                .execute(&self.pool)
                .await
            }
        }
        .map_err(|e| DomainError::Internal {
            message: format!("Failed to revoke user tokens: {}", e),
        })?;

        Ok(result.rows_affected() as usize)
    }

    async fn find_active_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RefreshToken>, DomainError> {
        let query = format!(
            "SELECT {} FROM refresh_tokens \
             WHERE user_id = ? AND status = 'active' AND expires_at > ? \
             ORDER BY last_used_at DESC",
            TOKEN_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(Utc::now())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find user tokens: {}", e),
            })?;

        let mut tokens = Vec::new();
        for row in rows {
            tokens.push(Self::row_to_token(&row)?);
        }

        Ok(tokens)
    }

    async fn delete_long_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        // Housekeeping only: active rows are never deleted, and recent
        // revoked rows are kept for audit.
        let result = sqlx::query(
            "DELETE FROM refresh_tokens \
             WHERE expires_at < ? AND status IN ('revoked', 'used')",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Failed to delete expired tokens: {}", e),
        })?;

        let deleted = result.rows_affected() as usize;
        if deleted > 0 {
            tracing::debug!(deleted, "purged long-expired refresh tokens");
        }
        Ok(deleted)
    }
}
