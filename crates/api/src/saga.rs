//! Multi-step workflows that span the database, the blob store and the
//! identity service.
//!
//! [`Saga`] runs steps in order and remembers how to undo each completed
//! one. When a later step fails, the recorded compensations run in reverse
//! order and the original error is returned. [`retry`] covers the opposite
//! case, where a step must eventually succeed and is retried instead of
//! undone.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;

type Compensation = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), String>> + Send>;

/// Ordered steps with compensations.
pub struct Saga {
    name: &'static str,
    compensations: Vec<(&'static str, Compensation)>,
}

impl Saga {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            compensations: Vec::new(),
        }
    }

    /// Await one step. On failure, unwind everything recorded so far.
    pub async fn run<T, E, Fut>(&mut self, step: &'static str, action: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        match action.await {
            Ok(value) => {
                tracing::debug!(saga = self.name, step, "Saga step completed");
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(saga = self.name, step, error = %e, "Saga step failed, compensating");
                self.unwind().await;
                Err(e)
            }
        }
    }

    /// Record how to undo the step that just completed.
    pub fn on_rollback<F>(&mut self, step: &'static str, compensate: F)
    where
        F: FnOnce() -> BoxFuture<'static, Result<(), String>> + Send + 'static,
    {
        self.compensations.push((step, Box::new(compensate)));
    }

    /// Finish successfully and discard the compensations.
    pub fn commit(mut self) {
        self.compensations.clear();
        tracing::debug!(saga = self.name, "Saga committed");
    }

    /// Run compensations newest first. Returns the steps whose compensation
    /// failed; those leave residue behind and are logged.
    pub async fn unwind(&mut self) -> Vec<&'static str> {
        let mut residue = Vec::new();
        while let Some((step, compensate)) = self.compensations.pop() {
            match compensate().await {
                Ok(()) => tracing::info!(saga = self.name, step, "Compensated saga step"),
                Err(e) => {
                    tracing::error!(saga = self.name, step, error = %e, "Compensation failed");
                    residue.push(step);
                }
            }
        }
        residue
    }
}

/// Retry an idempotent step with linear backoff.
///
/// Returns the last error once `attempts` are exhausted.
pub async fn retry<T, E, F, Fut>(
    step: &'static str,
    attempts: u32,
    backoff: Duration,
    mut action: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match action().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => {
                tracing::error!(step, attempt, error = %e, "Step failed, giving up");
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(step, attempt, error = %e, "Step failed, retrying");
                tokio::time::sleep(backoff * attempt).await;
                attempt += 1;
            }
        }
    }
}
