use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::auth_dto::{LogoutRequest, LogoutResponse};
use crate::handlers::error::{handle_domain_error, handle_validation_error};
use crate::middleware::auth::AuthContext;

use tm_core::repositories::{TokenRepository, UserRepository};
use tm_core::services::auth::PasswordVerifier;

use super::AppState;

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the active refresh token(s) for one of the caller's devices.
/// Requires authentication via Bearer token.
///
/// # Errors
/// - 401 Unauthorized: missing or invalid access token
pub async fn logout<U, P, R>(
    state: web::Data<AppState<U, P, R>>,
    auth: AuthContext,
    request: web::Json<LogoutRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    P: PasswordVerifier + 'static,
    R: TokenRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_error(&errors);
    }

    match state
        .session_service
        .logout(auth.user_id, &request.device_id)
        .await
    {
        Ok(revoked) => HttpResponse::Ok().json(LogoutResponse {
            message: "Logged out successfully".to_string(),
            revoked_sessions: revoked,
        }),
        Err(error) => handle_domain_error(&error),
    }
}
