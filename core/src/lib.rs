//! # TripMate Core
//!
//! Core business logic and domain layer for the TripMate backend.
//! This crate contains the domain entities, business services, repository
//! interfaces, and error types for the session/identity subsystem:
//! access-token issuance and verification, device-bound refresh-token
//! rotation with reuse/theft detection, and multi-device logout.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;
