//! Error taxonomy for the session/identity subsystem.
//!
//! Every variant here is terminal for the client: the only recovery from
//! any of them is a full re-login. Retrying an expired token is
//! pointless, and retrying a reuse- or theft-flagged token would mask a
//! security signal, so nothing in this subsystem retries.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password; the caller cannot tell the two
    /// cases apart
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Token-related errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    /// Access token is malformed, expired, carries a bad signature, or
    /// is not of type `access`
    #[error("Invalid access token")]
    InvalidAccessToken,

    /// Presented refresh secret matches no stored record
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// Refresh token presented by a device other than the one it was
    /// issued to; the whole family has been revoked
    #[error("Token theft detected")]
    TokenTheftDetected,

    /// An already-rotated refresh token resurfaced; the whole family has
    /// been revoked
    #[error("Token reuse detected")]
    TokenReuseDetected,

    /// Refresh token was revoked (logout or an earlier compromise
    /// cascade)
    #[error("Token revoked")]
    TokenRevoked,

    /// Refresh token is past its expiry timestamp
    #[error("Refresh token expired")]
    RefreshExpired,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DomainError;

    #[test]
    fn test_token_error_messages() {
        assert_eq!(
            TokenError::TokenReuseDetected.to_string(),
            "Token reuse detected"
        );
        assert_eq!(
            TokenError::TokenTheftDetected.to_string(),
            "Token theft detected"
        );
    }

    #[test]
    fn test_transparent_bridge() {
        let err: DomainError = TokenError::RefreshExpired.into();
        assert_eq!(err.to_string(), "Refresh token expired");
    }
}
