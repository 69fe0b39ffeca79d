//! Main authentication service implementation

use std::sync::Arc;

use crate::domain::entities::token::DeviceInfo;
use crate::domain::value_objects::LoginOutcome;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::{TokenRepository, UserRepository};
use crate::services::session::SessionService;

use super::password::PasswordVerifier;

/// Authentication service for the login flow.
///
/// Holds its dependencies explicitly; constructed once at startup and
/// shared behind `Arc`.
pub struct AuthService<U, P, R>
where
    U: UserRepository,
    P: PasswordVerifier,
    R: TokenRepository,
{
    user_repository: Arc<U>,
    password_verifier: Arc<P>,
    sessions: Arc<SessionService<R>>,
}

impl<U, P, R> AuthService<U, P, R>
where
    U: UserRepository,
    P: PasswordVerifier,
    R: TokenRepository,
{
    /// Creates a new authentication service
    pub fn new(
        user_repository: Arc<U>,
        password_verifier: Arc<P>,
        sessions: Arc<SessionService<R>>,
    ) -> Self {
        Self {
            user_repository,
            password_verifier,
            sessions,
        }
    }

    /// Authenticates a user and starts a session.
    ///
    /// Unknown email and wrong password both surface as
    /// `InvalidCredentials`. Device info is optional; without it the
    /// login is access-token-only and no refresh family is created.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        device: Option<DeviceInfo>,
    ) -> DomainResult<LoginOutcome> {
        let user = self
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;

        if !self
            .password_verifier
            .verify(password, &user.password_hash)?
        {
            tracing::debug!(user_id = %user.id, "login rejected: bad password");
            return Err(DomainError::Auth(AuthError::InvalidCredentials));
        }

        self.user_repository.update_last_login(user.id).await?;

        let tokens = self.sessions.start_session(user.id, device).await?;

        tracing::debug!(user_id = %user.id, "login succeeded");
        Ok(LoginOutcome { user, tokens })
    }
}
