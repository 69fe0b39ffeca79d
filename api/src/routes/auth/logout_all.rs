use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::auth_dto::{LogoutAllRequest, LogoutResponse};
use crate::handlers::error::{handle_domain_error, handle_validation_error};
use crate::middleware::auth::AuthContext;

use tm_core::repositories::{TokenRepository, UserRepository};
use tm_core::services::auth::PasswordVerifier;

use super::AppState;

/// Handler for POST /api/v1/auth/logout-all
///
/// Revokes every active refresh token for the caller, optionally sparing
/// one device (usually the one making the request). Requires
/// authentication via Bearer token.
pub async fn logout_all<U, P, R>(
    state: web::Data<AppState<U, P, R>>,
    auth: AuthContext,
    request: web::Json<LogoutAllRequest>,
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
        .logout_all(auth.user_id, request.except_device_id.as_deref())
        .await
    {
        Ok(revoked) => HttpResponse::Ok().json(LogoutResponse {
            message: "Logged out from all devices".to_string(),
            revoked_sessions: revoked,
        }),
        Err(error) => handle_domain_error(&error),
    }
}
