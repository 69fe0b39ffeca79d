//! Configuration objects for the TripMate backend.
//!
//! Each config struct is built from environment variables exactly once at
//! startup and then injected into the services that need it. Nothing in
//! here is mutated at runtime.

pub mod auth;
pub mod database;
pub mod environment;
pub mod server;

pub use auth::{AuthConfig, JwtConfig};
pub use database::DatabaseConfig;
pub use environment::Environment;
pub use server::ServerConfig;
