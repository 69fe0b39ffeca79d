//! Main token service implementation

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::entities::token::{AccessClaims, RevokedReason, TokenStatus, ACCESS_TOKEN_TYPE};
use crate::domain::value_objects::SessionTokens;
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::TokenRepository;

use super::config::TokenServiceConfig;

/// Length of the opaque refresh secret in alphanumeric characters.
/// 32 chars over a 62-symbol alphabet is just over 190 bits of entropy.
const OPAQUE_SECRET_LEN: usize = 32;

/// Service for access-token issuance/verification and refresh-token
/// rotation.
///
/// Signing and verification are pure given the configured secret; all
/// shared state lives behind the repository.
pub struct TokenService<R: TokenRepository> {
    repository: Arc<R>,
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl<R: TokenRepository> TokenService<R> {
    /// Creates a new token service instance
    pub fn new(repository: Arc<R>, config: TokenServiceConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            repository,
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Access token lifetime in seconds, as reported to clients
    pub fn access_expires_in(&self) -> i64 {
        self.config.access_token_expiry_minutes * 60
    }

    /// Refresh token lifetime in days for newly issued records
    pub fn refresh_expiry_days(&self) -> i64 {
        self.config.refresh_token_expiry_days
    }

    /// Issues a signed access token for a user
    pub fn issue_access_token(
        &self,
        user_id: Uuid,
        device_id: Option<&str>,
    ) -> DomainResult<String> {
        let claims = AccessClaims::new(
            user_id,
            device_id.map(|d| d.to_string()),
            self.config.access_token_expiry_minutes,
        );
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            DomainError::Internal {
                message: format!("Failed to sign access token: {}", e),
            }
        })
    }

    /// Verifies an access token and returns its claims.
    ///
    /// Pure and stateless. Fails with `InvalidAccessToken` on a bad
    /// signature, clock expiry, or a token whose type is not `access`.
    pub fn verify_access_token(&self, token: &str) -> DomainResult<AccessClaims> {
        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| DomainError::Token(TokenError::InvalidAccessToken))?;

        if token_data.claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(DomainError::Token(TokenError::InvalidAccessToken));
        }

        Ok(token_data.claims)
    }

    /// Generates a fresh opaque refresh secret.
    ///
    /// This is the value handed to the client; only its hash is ever
    /// stored.
    pub fn generate_opaque_secret() -> String {
        let mut rng = rand::thread_rng();
        (0..OPAQUE_SECRET_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..62);
                match idx {
                    0..10 => (b'0' + idx) as char,
                    10..36 => (b'a' + idx - 10) as char,
                    36..62 => (b'A' + idx - 36) as char,
                    _ => unreachable!(),
                }
            })
            .collect()
    }

    /// Hashes a refresh secret for storage and lookup
    pub fn hash_secret(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Rotates a refresh token: exchanges a valid secret for a new
    /// access + refresh pair.
    ///
    /// The decision ladder, in order:
    /// 1. unknown hash          -> `InvalidRefreshToken`
    /// 2. device mismatch       -> revoke family, `TokenTheftDetected`
    /// 3. already used          -> revoke family, `TokenReuseDetected`
    /// 4. revoked               -> `TokenRevoked`
    /// 5. expired               -> `RefreshExpired`
    /// 6. otherwise consume the record and insert its successor in one
    ///    atomic step; losing that race is treated exactly like reuse.
    ///
    /// Family cascades complete before the error is returned, so a
    /// racing rotation cannot slip through mid-cascade.
    pub async fn rotate(&self, secret: &str, device_id: &str) -> DomainResult<SessionTokens> {
        let token_hash = Self::hash_secret(secret);

        let record = self
            .repository
            .find_by_hash(&token_hash)
            .await?
            .ok_or(DomainError::Token(TokenError::InvalidRefreshToken))?;

        // A refresh token is only ever legitimately presented by the
        // device that received it; a mismatch implies exfiltration.
        if record.device_id != device_id {
            tracing::warn!(
                user_id = %record.user_id,
                family_id = %record.family_id,
                expected_device = %record.device_id,
                presented_device = %device_id,
                "refresh token presented by wrong device, revoking family"
            );
            self.repository
                .revoke_family(record.family_id, RevokedReason::DeviceMismatch)
                .await?;
            return Err(DomainError::Token(TokenError::TokenTheftDetected));
        }

        // A rotated-out token must never resurface; resurfacing means
        // either a race or an attacker's copy, treated identically.
        if record.status == TokenStatus::Used {
            tracing::warn!(
                user_id = %record.user_id,
                family_id = %record.family_id,
                "used refresh token replayed, revoking family"
            );
            self.repository
                .revoke_family(record.family_id, RevokedReason::ReuseDetected)
                .await?;
            return Err(DomainError::Token(TokenError::TokenReuseDetected));
        }

        if record.status == TokenStatus::Revoked {
            return Err(DomainError::Token(TokenError::TokenRevoked));
        }

        let now = Utc::now();
        if now > record.expires_at {
            return Err(DomainError::Token(TokenError::RefreshExpired));
        }

        let new_secret = Self::generate_opaque_secret();
        let successor = record.successor(
            Self::hash_secret(&new_secret),
            self.config.refresh_token_expiry_days,
        );

        let won = self
            .repository
            .rotate_active(record.id, now, successor)
            .await?;
        if !won {
            // Lost the conditional update: a concurrent caller rotated
            // this secret first. Indistinguishable from a replay.
            tracing::warn!(
                user_id = %record.user_id,
                family_id = %record.family_id,
                "concurrent rotation on one refresh token, revoking family"
            );
            self.repository
                .revoke_family(record.family_id, RevokedReason::ReuseDetected)
                .await?;
            return Err(DomainError::Token(TokenError::TokenReuseDetected));
        }

        tracing::debug!(
            user_id = %record.user_id,
            family_id = %record.family_id,
            device_id = %device_id,
            "refresh token rotated"
        );

        let access_token = self.issue_access_token(record.user_id, Some(device_id))?;

        Ok(SessionTokens::new(
            access_token,
            Some(new_secret),
            self.access_expires_in(),
        ))
    }
}
