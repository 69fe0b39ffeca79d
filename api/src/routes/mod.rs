//! API route handlers.

pub mod auth;
