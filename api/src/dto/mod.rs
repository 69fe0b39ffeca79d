//! Request and response DTOs.

pub mod auth_dto;

pub use tm_shared::types::ErrorResponse;
