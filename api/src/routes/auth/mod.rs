//! Authentication route handlers
//!
//! All session/identity endpoints:
//! - Login (credential check + session start)
//! - Token refresh (rotation)
//! - Logout and logout-all
//! - Device session listing

pub mod devices;
pub mod login;
pub mod logout;
pub mod logout_all;
pub mod refresh;

use std::sync::Arc;

use tm_core::repositories::{TokenRepository, UserRepository};
use tm_core::services::auth::{AuthService, PasswordVerifier};
use tm_core::services::session::SessionService;
use tm_core::services::token::TokenService;

/// Shared application state injected into every handler
pub struct AppState<U, P, R>
where
    U: UserRepository,
    P: PasswordVerifier,
    R: TokenRepository,
{
    pub auth_service: Arc<AuthService<U, P, R>>,
    pub token_service: Arc<TokenService<R>>,
    pub session_service: Arc<SessionService<R>>,
}
