//! Session directory implementation

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::token::{DeviceInfo, RefreshToken, RevokedReason};
use crate::domain::entities::DeviceSession;
use crate::domain::value_objects::SessionTokens;
use crate::errors::DomainResult;
use crate::repositories::TokenRepository;
use crate::services::token::TokenService;

/// Session-level operations built on the refresh-token store.
pub struct SessionService<R: TokenRepository> {
    repository: Arc<R>,
    tokens: Arc<TokenService<R>>,
}

impl<R: TokenRepository> SessionService<R> {
    /// Creates a new session service
    pub fn new(repository: Arc<R>, tokens: Arc<TokenService<R>>) -> Self {
        Self { repository, tokens }
    }

    /// Starts a session at login.
    ///
    /// Always issues an access token. When device info is supplied, a
    /// brand-new refresh-token family is rooted for that device and the
    /// opaque secret is returned alongside; without device info the
    /// session is access-token-only.
    pub async fn start_session(
        &self,
        user_id: Uuid,
        device: Option<DeviceInfo>,
    ) -> DomainResult<SessionTokens> {
        let access_token = self
            .tokens
            .issue_access_token(user_id, device.as_ref().map(|d| d.device_id.as_str()))?;

        let refresh_token = match device {
            Some(device) => {
                let secret = TokenService::<R>::generate_opaque_secret();
                let root = RefreshToken::family_root(
                    user_id,
                    device,
                    TokenService::<R>::hash_secret(&secret),
                    self.tokens.refresh_expiry_days(),
                );

                tracing::debug!(
                    user_id = %user_id,
                    family_id = %root.family_id,
                    device_id = %root.device_id,
                    "new refresh token family rooted"
                );
                self.repository.save(root).await?;
                Some(secret)
            }
            None => None,
        };

        Ok(SessionTokens::new(
            access_token,
            refresh_token,
            self.tokens.access_expires_in(),
        ))
    }

    /// Lists the user's logged-in devices, most recently used first.
    ///
    /// One entry per device: the most recent active record wins when a
    /// device carries several families (e.g. repeated logins).
    pub async fn list_devices(&self, user_id: Uuid) -> DomainResult<Vec<DeviceSession>> {
        let active = self.repository.find_active_by_user(user_id).await?;

        let mut sessions: Vec<DeviceSession> = Vec::new();
        for record in &active {
            if sessions.iter().any(|s| s.device_id == record.device_id) {
                continue;
            }
            sessions.push(DeviceSession::from(record));
        }

        Ok(sessions)
    }

    /// Logs out one device, revoking its active refresh token(s)
    pub async fn logout(&self, user_id: Uuid, device_id: &str) -> DomainResult<usize> {
        let revoked = self
            .repository
            .revoke_device(user_id, device_id, RevokedReason::Logout)
            .await?;

        tracing::debug!(user_id = %user_id, device_id = %device_id, revoked, "device logged out");
        Ok(revoked)
    }

    /// Logs out every device, optionally sparing one
    pub async fn logout_all(
        &self,
        user_id: Uuid,
        except_device_id: Option<&str>,
    ) -> DomainResult<usize> {
        let revoked = self
            .repository
            .revoke_all_for_user(user_id, except_device_id, RevokedReason::LogoutAll)
            .await?;

        tracing::debug!(user_id = %user_id, revoked, "all devices logged out");
        Ok(revoked)
    }
}
