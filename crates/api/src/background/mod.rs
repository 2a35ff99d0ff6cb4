//! Background tasks and scheduled jobs.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned via `tokio::spawn`. All tasks accept a [`CancellationToken`]
//! for graceful shutdown, and expose a single-pass function so the same
//! work can be triggered on demand and tested without timers.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod image_sync;
pub mod inactivity_scan;
