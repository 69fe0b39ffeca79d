//! Domain-error to HTTP response mapping.
//!
//! Every token failure maps to HTTP 401 with a stable machine-readable
//! code. All of them are terminal for the client: the contract is
//! "re-login", never "retry".

use actix_web::HttpResponse;
use validator::ValidationErrors;

use crate::dto::ErrorResponse;
use tm_core::errors::{AuthError, DomainError, TokenError};

/// Handle domain errors and convert them to HTTP responses
pub fn handle_domain_error(error: &DomainError) -> HttpResponse {
    log::warn!("Domain error: {:?}", error);

    match error {
        DomainError::Auth(AuthError::InvalidCredentials) => HttpResponse::Unauthorized()
            .json(ErrorResponse::new(
                "AUTH_INVALID_CREDENTIALS",
                "Invalid email or password",
            )),
        DomainError::Token(token_error) => {
            let (code, message) = match token_error {
                TokenError::InvalidAccessToken => {
                    ("AUTH_INVALID_ACCESS", "Access token is invalid or expired")
                }
                TokenError::InvalidRefreshToken => {
                    ("AUTH_INVALID_REFRESH", "Refresh token is not recognized")
                }
                TokenError::TokenTheftDetected => (
                    "AUTH_TOKEN_THEFT",
                    "Refresh token presented by an unexpected device; all sessions in its lineage have been revoked",
                ),
                TokenError::TokenReuseDetected => (
                    "AUTH_TOKEN_REUSE",
                    "Refresh token was already rotated; all sessions in its lineage have been revoked",
                ),
                TokenError::TokenRevoked => ("AUTH_TOKEN_REVOKED", "Refresh token has been revoked"),
                TokenError::RefreshExpired => ("AUTH_REFRESH_EXPIRED", "Refresh token has expired"),
            };
            HttpResponse::Unauthorized().json(ErrorResponse::new(code, message))
        }
        DomainError::Validation { message } => {
            HttpResponse::BadRequest().json(ErrorResponse::new("VALIDATION_ERROR", message))
        }
        DomainError::NotFound { resource } => HttpResponse::NotFound().json(ErrorResponse::new(
            "NOT_FOUND",
            format!("{} not found", resource),
        )),
        DomainError::Internal { .. } => {
            // Internal detail stays in the log, not in the response.
            log::error!("Internal error: {:?}", error);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "INTERNAL_ERROR",
                "An internal error occurred",
            ))
        }
    }
}

/// Handle DTO validation failures
pub fn handle_validation_error(errors: &ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::new(
        "VALIDATION_ERROR",
        format!("Invalid request: {}", errors),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_errors_map_to_unauthorized() {
        let errors = [
            TokenError::InvalidAccessToken,
            TokenError::InvalidRefreshToken,
            TokenError::TokenTheftDetected,
            TokenError::TokenReuseDetected,
            TokenError::TokenRevoked,
            TokenError::RefreshExpired,
        ];

        for error in errors {
            let response = handle_domain_error(&DomainError::Token(error));
            assert_eq!(response.status(), actix_web::http::StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_invalid_credentials_maps_to_unauthorized() {
        let response =
            handle_domain_error(&DomainError::Auth(AuthError::InvalidCredentials));
        assert_eq!(response.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }
}
