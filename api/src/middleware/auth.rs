//! JWT authentication middleware for protecting API endpoints.
//!
//! Extracts the Bearer token from the Authorization header, verifies it
//! through the token service, and injects the caller's identity into the
//! request. Protected handlers receive an `AuthContext` and trust it
//! unconditionally; any verification failure stops the request with 401
//! before a handler runs.

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    http::header::AUTHORIZATION,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};
use uuid::Uuid;

use tm_core::domain::entities::token::AccessClaims;
use tm_core::errors::{DomainError, DomainResult, TokenError};
use tm_core::repositories::TokenRepository;
use tm_core::services::token::TokenService;

/// Verified caller identity injected into requests
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User ID extracted from the access-token claims
    pub user_id: Uuid,
    /// Device the access token was issued to, if the login was
    /// device-bound
    pub device_id: Option<String>,
}

impl AuthContext {
    /// Creates an authentication context from verified claims
    pub fn from_claims(claims: AccessClaims) -> DomainResult<Self> {
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidAccessToken))?;
        Ok(Self {
            user_id,
            device_id: claims.device_id,
        })
    }
}

/// Object-safe access-token verification, so the middleware does not
/// need the repository type parameter
pub trait AccessTokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> DomainResult<AccessClaims>;
}

impl<R: TokenRepository> AccessTokenVerifier for TokenService<R> {
    fn verify(&self, token: &str) -> DomainResult<AccessClaims> {
        self.verify_access_token(token)
    }
}

/// JWT authentication middleware factory
#[derive(Default)]
pub struct JwtAuth;

impl JwtAuth {
    /// Creates a new JWT authentication middleware
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let token = match extract_bearer_token(&req) {
                Some(token) => token,
                None => {
                    return Err(ErrorUnauthorized("Missing or invalid Authorization header"));
                }
            };

            let Some(verifier) = req.app_data::<web::Data<Arc<dyn AccessTokenVerifier>>>()
            else {
                return Err(ErrorUnauthorized("Token verification not configured"));
            };

            let auth_context = match verifier.verify(&token) {
                Ok(claims) => match AuthContext::from_claims(claims) {
                    Ok(context) => context,
                    Err(e) => return Err(ErrorUnauthorized(format!("Invalid token: {}", e))),
                },
                Err(e) => {
                    return Err(ErrorUnauthorized(format!(
                        "Token verification failed: {}",
                        e
                    )))
                }
            };

            req.extensions_mut().insert(auth_context);

            service.call(req).await
        })
    }
}

/// Extracts Bearer token from Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.to_string())
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ErrorUnauthorized("Authentication required"));

        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        use actix_web::test;

        let req = test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer test_token_123"))
            .to_srv_request();

        assert_eq!(extract_bearer_token(&req), Some("test_token_123".to_string()));

        let req_no_bearer = test::TestRequest::default()
            .insert_header((AUTHORIZATION, "test_token_123"))
            .to_srv_request();

        assert_eq!(extract_bearer_token(&req_no_bearer), None);

        let req_no_header = test::TestRequest::default().to_srv_request();
        assert_eq!(extract_bearer_token(&req_no_header), None);
    }
}
