//! Error types for configuration validation and the internal solver.

/// All errors that could occur while constructing or running an inversion.
///
/// These never escape [`crate::invert`] or [`crate::invert_with_progress`]:
/// the public entry points catch every variant at the boundary and fold it
/// into a failed [`crate::InversionResult`] instead. They're exposed so that
/// callers using the lower-level component API (`ForwardSolver`,
/// `JacobianCalculator`, `Optimizer`, ...) directly can still match on them.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A parameter was out of range or internally inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The damped normal equations could not be factored (Cholesky failed
    /// and the LU fallback produced a non-finite step).
    #[error("optimizer could not factor the damped normal equations")]
    SolverFailure,
    /// The caller's [`crate::Progress::should_cancel`] returned `true`.
    #[error("inversion was cancelled after iteration {iterations}")]
    Cancelled {
        /// Number of completed Gauss-Newton iterations before cancellation.
        iterations: usize,
    },
}
