//! Integration tests for the session/identity endpoints

use actix_web::{http::header, test, web};
use serde_json::{json, Value};
use std::sync::Arc;

use tm_api::app::create_app;
use tm_api::routes::auth::AppState;
use tm_core::domain::entities::User;
use tm_core::repositories::{MockTokenRepository, MockUserRepository};
use tm_core::services::auth::{AuthService, PlainTextPasswordVerifier};
use tm_core::services::session::SessionService;
use tm_core::services::token::{TokenService, TokenServiceConfig};

type TestState = AppState<MockUserRepository, PlainTextPasswordVerifier, MockTokenRepository>;

const EMAIL: &str = "noa@example.com";
const PASSWORD: &str = "correct-horse-battery";

/// Builds an app state over in-memory repositories with one seeded user.
async fn test_state() -> web::Data<TestState> {
    let user_repository = Arc::new(MockUserRepository::new());
    user_repository
        .insert(User::new(
            EMAIL.to_string(),
            // The plain-text verifier compares directly, so the stored
            // digest is the password itself.
            PASSWORD.to_string(),
            Some("Noa".to_string()),
        ))
        .await;

    let token_repository = Arc::new(MockTokenRepository::new());
    let token_service = Arc::new(TokenService::new(
        token_repository.clone(),
        TokenServiceConfig::default(),
    ));
    let session_service = Arc::new(SessionService::new(token_repository, token_service.clone()));
    let auth_service = Arc::new(AuthService::new(
        user_repository,
        Arc::new(PlainTextPasswordVerifier),
        session_service.clone(),
    ));

    web::Data::new(AppState {
        auth_service,
        token_service,
        session_service,
    })
}

fn login_request(device_id: &str) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({
            "email": EMAIL,
            "password": PASSWORD,
            "device_id": device_id,
            "device_name": "Test Phone",
            "platform": "ios",
        }))
        .to_request()
}

fn refresh_request(refresh_token: &str, device_id: &str) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": refresh_token, "device_id": device_id }))
        .to_request()
}

#[actix_web::test]
async fn test_login_returns_tokens_and_user() {
    let app = test::init_service(create_app(test_state().await)).await;

    let resp = test::call_service(&app, login_request("dev-A")).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], EMAIL);
    assert_eq!(body["expires_in"], 900);
    assert!(!body["access_token"].as_str().unwrap().is_empty());
    assert!(!body["refresh_token"].as_str().unwrap().is_empty());
}

#[actix_web::test]
async fn test_login_without_device_omits_refresh_token() {
    let app = test::init_service(create_app(test_state().await)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": EMAIL, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("refresh_token").is_none());
}

#[actix_web::test]
async fn test_login_rejects_bad_password() {
    let app = test::init_service(create_app(test_state().await)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": EMAIL, "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "AUTH_INVALID_CREDENTIALS");
}

#[actix_web::test]
async fn test_refresh_rotates_and_replay_is_terminal() {
    let app = test::init_service(create_app(test_state().await)).await;

    // Login on dev-A yields T0.
    let resp = test::call_service(&app, login_request("dev-A")).await;
    let body: Value = test::read_body_json(resp).await;
    let t0 = body["refresh_token"].as_str().unwrap().to_string();

    // Refresh with T0 succeeds and returns T1.
    let resp = test::call_service(&app, refresh_request(&t0, "dev-A")).await;
    assert_eq!(resp.status(), 200);
    let rotated: Value = test::read_body_json(resp).await;
    let t1 = rotated["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(t0, t1);

    // Replaying T0 trips reuse detection.
    let resp = test::call_service(&app, refresh_request(&t0, "dev-A")).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "AUTH_TOKEN_REUSE");

    // The family is dead: T1 now fails as revoked.
    let resp = test::call_service(&app, refresh_request(&t1, "dev-A")).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "AUTH_TOKEN_REVOKED");
}

#[actix_web::test]
async fn test_refresh_from_wrong_device_is_theft() {
    let app = test::init_service(create_app(test_state().await)).await;

    let resp = test::call_service(&app, login_request("dev-A")).await;
    let body: Value = test::read_body_json(resp).await;
    let t0 = body["refresh_token"].as_str().unwrap().to_string();

    // Correct secret, wrong device.
    let resp = test::call_service(&app, refresh_request(&t0, "dev-B")).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "AUTH_TOKEN_THEFT");

    // The cascade revoked the legitimate token too.
    let resp = test::call_service(&app, refresh_request(&t0, "dev-A")).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "AUTH_TOKEN_REVOKED");
}

#[actix_web::test]
async fn test_unknown_refresh_token() {
    let app = test::init_service(create_app(test_state().await)).await;

    let resp = test::call_service(&app, refresh_request("never-issued", "dev-A")).await;

    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "AUTH_INVALID_REFRESH");
}

#[actix_web::test]
async fn test_devices_listing_and_logout() {
    let app = test::init_service(create_app(test_state().await)).await;

    let resp = test::call_service(&app, login_request("dev-A")).await;
    let body: Value = test::read_body_json(resp).await;
    let access_a = body["access_token"].as_str().unwrap().to_string();
    test::call_service(&app, login_request("dev-B")).await;

    // Both devices appear in the listing.
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/devices")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", access_a)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["devices"].as_array().unwrap().len(), 2);

    // Logging out dev-B leaves only dev-A.
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", access_a)))
        .set_json(json!({ "device_id": "dev-B" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["revoked_sessions"], 1);

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/devices")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", access_a)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let devices = body["devices"].as_array().unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0]["device_id"], "dev-A");
}

#[actix_web::test]
async fn test_logout_all_spares_named_device() {
    let app = test::init_service(create_app(test_state().await)).await;

    let resp = test::call_service(&app, login_request("dev-A")).await;
    let body: Value = test::read_body_json(resp).await;
    let access_a = body["access_token"].as_str().unwrap().to_string();
    test::call_service(&app, login_request("dev-B")).await;
    test::call_service(&app, login_request("dev-C")).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout-all")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", access_a)))
        .set_json(json!({ "except_device_id": "dev-A" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["revoked_sessions"], 2);

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/devices")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", access_a)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let devices = body["devices"].as_array().unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0]["device_id"], "dev-A");
}

#[actix_web::test]
async fn test_protected_route_requires_token() {
    let app = test::init_service(create_app(test_state().await)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/devices")
        .to_request();
    let resp = test::try_call_service(&app, req).await;

    assert_eq!(resp.err().unwrap().error_response().status(), 401);
}

#[actix_web::test]
async fn test_protected_route_rejects_garbage_token() {
    let app = test::init_service(create_app(test_state().await)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/devices")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-real-token"))
        .to_request();
    let resp = test::try_call_service(&app, req).await;

    assert_eq!(resp.err().unwrap().error_response().status(), 401);
}
