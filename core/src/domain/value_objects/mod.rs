//! Value objects returned by the session/identity services.

pub mod auth_response;

pub use auth_response::{LoginOutcome, SessionTokens};
