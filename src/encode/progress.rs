use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{ReelError, ReelResult};

/// Cooperative cancellation flag shared between a caller and a running pipeline.
///
/// Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancellation was requested.
    pub fn check(&self, during: &str) -> ReelResult<()> {
        if self.is_cancelled() {
            return Err(ReelError::cancelled(format!("run cancelled during {during}")));
        }
        Ok(())
    }
}

/// Receives encoding progress as a fraction in `[0, 1]`.
pub trait ProgressObserver: Send + Sync {
    /// Called with non-decreasing fractions; `1.0` is reported once, on success.
    fn on_progress(&self, fraction: f64);
}

impl<F> ProgressObserver for F
where
    F: Fn(f64) + Send + Sync,
{
    fn on_progress(&self, fraction: f64) {
        self(fraction)
    }
}

/// Clamps and de-duplicates reports to an optional observer.
pub(crate) struct ProgressReporter<'a> {
    observer: Option<&'a dyn ProgressObserver>,
    last: f64,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(observer: Option<&'a dyn ProgressObserver>) -> Self {
        Self {
            observer,
            last: -1.0,
        }
    }

    /// Report `done` of `total` units of work, keeping `1.0` for [`ProgressReporter::complete`].
    pub(crate) fn step(&mut self, done: u64, total: u64) {
        let fraction = done as f64 / (total + 1) as f64;
        self.report(fraction.min(1.0 - f64::EPSILON));
    }

    pub(crate) fn complete(&mut self) {
        self.report(1.0);
    }

    fn report(&mut self, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0);
        if fraction <= self.last {
            return;
        }
        self.last = fraction;
        if let Some(observer) = self.observer {
            observer.on_progress(fraction);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/progress.rs"]
mod tests;
