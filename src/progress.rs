//! Observer interface for reporting Gauss-Newton progress and requesting
//! cooperative cancellation.

/// Callback-plus-cancellation observer for [`crate::InversionCore`].
///
/// Replaces the shape of a C-style function pointer and `void*` user data:
/// implement this trait on whatever your host wants to receive updates
/// (a channel sender, a shared `Mutex<Vec<_>>`, a UI event sink) and pass
/// it to [`crate::invert_with_progress`]. Neither method is async; both
/// are called synchronously between Gauss-Newton iterations, never from
/// inside a forward evaluation.
pub trait Progress {
    /// Called once after each completed iteration.
    ///
    /// `iteration` is 1-based (the count of iterations completed so far),
    /// `residual_norm` is `||d_obs - d_syn||` *before* this iteration's
    /// update, and `dm_norm` is `||dm||` for the update just applied.
    fn on_iteration(&mut self, iteration: usize, residual_norm: f64, dm_norm: f64);

    /// Polled once between iterations. Return `true` to stop the loop
    /// early; the run is then reported as cancelled, retaining the model
    /// and histories accumulated so far. Defaults to never cancelling.
    fn should_cancel(&self) -> bool {
        false
    }
}

/// A [`Progress`] implementation that ignores every callback and never
/// cancels. Used by [`crate::invert`], which doesn't need an observer.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpProgress;

impl Progress for NoOpProgress {
    fn on_iteration(&mut self, _iteration: usize, _residual_norm: f64, _dm_norm: f64) {}
}
