//! # TripMate Infrastructure
//!
//! Concrete implementations of the core repository and credential
//! interfaces: MySQL persistence via SQLx and the bcrypt password
//! verifier.

pub mod database;
pub mod security;
