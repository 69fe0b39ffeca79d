use std::sync::Arc;

use actix_web::{web, HttpServer};
use dotenvy::dotenv;
use log::info;

mod app;
mod config;
mod dto;
mod handlers;
mod middleware;
mod routes;

use config::Config;
use routes::auth::AppState;

use tm_core::services::auth::AuthService;
use tm_core::services::session::SessionService;
use tm_core::services::token::{TokenService, TokenServiceConfig};
use tm_infra::database::mysql::{MySqlTokenRepository, MySqlUserRepository};
use tm_infra::database::create_pool;
use tm_infra::security::BcryptPasswordVerifier;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting TripMate API server");

    // Configuration is assembled once here and injected; nothing reads
    // the environment after startup.
    let config = Config::from_env();
    if config.is_production() && config.auth.jwt.is_using_default_secret() {
        anyhow::bail!("JWT_SECRET must be set in production");
    }

    let pool = create_pool(&config.database).await?;
    info!("Database pool ready");

    let user_repository = Arc::new(MySqlUserRepository::new(pool.clone()));
    let token_repository = Arc::new(MySqlTokenRepository::new(pool));

    let token_service = Arc::new(TokenService::new(
        token_repository.clone(),
        TokenServiceConfig::from(&config.auth),
    ));
    let session_service = Arc::new(SessionService::new(
        token_repository,
        token_service.clone(),
    ));
    let auth_service = Arc::new(AuthService::new(
        user_repository,
        Arc::new(BcryptPasswordVerifier),
        session_service.clone(),
    ));

    let app_state = web::Data::new(AppState {
        auth_service,
        token_service,
        session_service,
    });

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    HttpServer::new(move || app::create_app(app_state.clone()))
        .bind(&bind_address)?
        .run()
        .await?;

    Ok(())
}
