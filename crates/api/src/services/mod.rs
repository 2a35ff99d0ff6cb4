//! Business workflows shared by the handlers and background jobs.
//!
//! Handlers stay thin: they extract and authorize, then call into here.

pub mod accounts;
pub mod activity;
pub mod export;
pub mod images;
pub mod notify;
pub mod workflow;
