//! # TripMate Shared
//!
//! Cross-cutting types shared by every layer of the TripMate backend:
//! configuration objects loaded once at process startup and the common
//! API response envelope.

pub mod config;
pub mod types;
