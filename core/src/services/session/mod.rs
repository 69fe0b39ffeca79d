//! Session directory module
//!
//! Session-level operations over the refresh-token store: login creates
//! a new token family, plus device listing, single-device logout, and
//! multi-device logout.

mod service;

#[cfg(test)]
mod tests;

pub use service::SessionService;
