//! Domain entities

pub mod session;
pub mod token;
pub mod user;

pub use session::DeviceSession;
pub use token::{AccessClaims, DeviceInfo, RefreshToken, RevokedReason, TokenStatus};
pub use user::User;
