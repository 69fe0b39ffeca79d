use actix_web::{web, HttpResponse};

use crate::dto::auth_dto::{DeviceListResponse, DeviceSessionDto};
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::AuthContext;

use tm_core::repositories::{TokenRepository, UserRepository};
use tm_core::services::auth::PasswordVerifier;

use super::AppState;

/// Handler for GET /api/v1/auth/devices
///
/// Lists the caller's logged-in devices, most recently used first.
/// Secrets and token hashes are never exposed. Requires authentication
/// via Bearer token.
pub async fn devices<U, P, R>(
    state: web::Data<AppState<U, P, R>>,
    auth: AuthContext,
) -> HttpResponse
where
    U: UserRepository + 'static,
    P: PasswordVerifier + 'static,
    R: TokenRepository + 'static,
{
    match state.session_service.list_devices(auth.user_id).await {
        Ok(sessions) => HttpResponse::Ok().json(DeviceListResponse {
            devices: sessions.iter().map(DeviceSessionDto::from).collect(),
        }),
        Err(error) => handle_domain_error(&error),
    }
}
