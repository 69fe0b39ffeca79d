use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LoginResponse, UserDto};
use crate::handlers::error::{handle_domain_error, handle_validation_error};

use tm_core::repositories::{TokenRepository, UserRepository};
use tm_core::services::auth::PasswordVerifier;

use super::AppState;

/// Handler for POST /api/v1/auth/login
///
/// Verifies credentials and starts a session. With device info in the
/// request a refresh-token family is rooted for that device and the
/// opaque refresh secret is returned; without it the response carries
/// only an access token.
///
/// # Errors
/// - 400 Bad Request: malformed request body
/// - 401 Unauthorized: unknown email or wrong password
pub async fn login<U, P, R>(
    state: web::Data<AppState<U, P, R>>,
    request: web::Json<LoginRequest>,
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
        .auth_service
        .login(&request.email, &request.password, request.device_info())
        .await
    {
        Ok(outcome) => HttpResponse::Ok().json(LoginResponse {
            user: UserDto::from(&outcome.user),
            access_token: outcome.tokens.access_token,
            refresh_token: outcome.tokens.refresh_token,
            expires_in: outcome.tokens.expires_in,
        }),
        Err(error) => handle_domain_error(&error),
    }
}
