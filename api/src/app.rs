//! Application factory
//!
//! Builds the Actix-web application around a prepared `AppState`.

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpResponse};

use crate::middleware::auth::{AccessTokenVerifier, JwtAuth};
use crate::middleware::cors::create_cors;
use crate::routes::auth::{
    devices::devices, login::login, logout::logout, logout_all::logout_all, refresh::refresh,
    AppState,
};

use tm_core::repositories::{TokenRepository, UserRepository};
use tm_core::services::auth::PasswordVerifier;

/// Create and configure the application with all dependencies
pub fn create_app<U, P, R>(
    app_state: web::Data<AppState<U, P, R>>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    U: UserRepository + 'static,
    P: PasswordVerifier + 'static,
    R: TokenRepository + 'static,
{
    // The JWT middleware verifies through an object-safe view of the
    // token service, registered separately so it needs no type params.
    let verifier: Arc<dyn AccessTokenVerifier> = app_state.token_service.clone();

    let cors = create_cors();

    App::new()
        .app_data(app_state)
        .app_data(web::Data::new(verifier))
        .wrap(Logger::default())
        .wrap(cors)
        // Health check endpoint
        .route("/health", web::get().to(health_check))
        // API v1 routes
        .service(
            web::scope("/api/v1").service(
                web::scope("/auth")
                    .route("/login", web::post().to(login::<U, P, R>))
                    .route("/refresh", web::post().to(refresh::<U, P, R>))
                    .route(
                        "/logout",
                        web::post().to(logout::<U, P, R>).wrap(JwtAuth::new()),
                    )
                    .route(
                        "/logout-all",
                        web::post().to(logout_all::<U, P, R>).wrap(JwtAuth::new()),
                    )
                    .route(
                        "/devices",
                        web::get().to(devices::<U, P, R>).wrap(JwtAuth::new()),
                    ),
            ),
        )
        // Default 404 handler
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "tripmate-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "NOT_FOUND",
        "message": "The requested resource was not found"
    }))
}
