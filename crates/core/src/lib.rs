//! Domain logic for the client intake service.
//!
//! This crate has no database or HTTP dependencies. Everything here is
//! evaluated against values loaded by the caller.

pub mod client;
pub mod clock;
pub mod error;
pub mod export;
pub mod form;
pub mod image_catalog;
pub mod inactivity;
pub mod notification;
pub mod progress;
pub mod review;
pub mod roles;
pub mod types;
