use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::auth_dto::{RefreshResponse, RefreshTokenRequest};
use crate::handlers::error::{handle_domain_error, handle_validation_error};

use tm_core::repositories::{TokenRepository, UserRepository};
use tm_core::services::auth::PasswordVerifier;

use super::AppState;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges a valid refresh token for a fresh access + refresh pair,
/// invalidating the presented one. No Bearer token is required here:
/// the refresh secret itself is the credential.
///
/// # Errors
/// All failures surface as 401 with a machine-readable code and are
/// terminal for the client:
/// - `AUTH_INVALID_REFRESH`: secret matches no record
/// - `AUTH_TOKEN_THEFT`: presented by the wrong device, family revoked
/// - `AUTH_TOKEN_REUSE`: already-rotated secret replayed, family revoked
/// - `AUTH_TOKEN_REVOKED`: token was revoked earlier
/// - `AUTH_REFRESH_EXPIRED`: token past its expiry
pub async fn refresh<U, P, R>(
    state: web::Data<AppState<U, P, R>>,
    request: web::Json<RefreshTokenRequest>,
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
        .token_service
        .rotate(&request.refresh_token, &request.device_id)
        .await
    {
        Ok(tokens) => {
            // rotate always issues a successor secret
            let refresh_token = tokens.refresh_token.unwrap_or_default();
            HttpResponse::Ok().json(RefreshResponse {
                access_token: tokens.access_token,
                refresh_token,
                expires_in: tokens.expires_in,
            })
        }
        Err(error) => handle_domain_error(&error),
    }
}
