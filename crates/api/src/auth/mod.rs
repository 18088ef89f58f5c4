//! Authentication primitives.
//!
//! - [`jwt`] -- access-token validation (tokens are issued by the external
//!   auth provider).
//! - [`hub`] -- per-user current-user streams that chat sessions subscribe to.

pub mod hub;
pub mod jwt;
