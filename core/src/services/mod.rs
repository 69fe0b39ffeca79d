//! Business services for the session/identity subsystem.

pub mod auth;
pub mod session;
pub mod token;
