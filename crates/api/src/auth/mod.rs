//! Authentication primitives.
//!
//! - [`jwt`] -- bearer token validation against the identity service secret.

pub mod jwt;
