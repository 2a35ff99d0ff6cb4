//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Validates the bearer token and loads the caller's profile.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireClient`] -- Requires the `client` role.

pub mod auth;
pub mod rbac;
