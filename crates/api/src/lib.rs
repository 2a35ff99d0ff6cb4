//! Intake API server library.
//!
//! HTTP surface for client onboarding: clients fill in their store listing
//! form and upload images, administrators review, export and track the
//! project. Exposes config, state, error handling, routes, services and
//! background jobs so integration tests and the binary can share them.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod saga;
pub mod services;
pub mod state;
pub mod storage;
