//! Repository interfaces for the domain layer.
//!
//! Each repository is a trait implemented against MySQL in the infra
//! crate, with an in-memory mock alongside for tests.

pub mod token;
pub mod user;

pub use token::{MockTokenRepository, TokenRepository};
pub use user::{MockUserRepository, UserRepository};
