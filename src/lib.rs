//! A 1-D magnetotelluric forward modelling and Gauss-Newton inversion engine.
//!
//! Given a layered earth discretisation and a period grid, [`invert`] runs
//! a damped Gauss-Newton loop that reduces the misfit between observed
//! apparent-resistivity/phase data and the forward response of a layer
//! model, under a Tikhonov smoothness prior. If no observations are
//! supplied, a synthetic three-block truth model and noisy observations
//! are generated for you, so the crate is useful as its own demo.
//!
//! ```
//! use mt1d_inversion::{invert, InversionParams};
//!
//! let params = InversionParams {
//!     m: 10,
//!     n_freq: 15,
//!     max_iter: 5,
//!     ..InversionParams::default()
//! };
//! let result = invert(params);
//! assert!(result.success());
//! ```
//!
//! For per-iteration progress and cooperative cancellation, implement
//! [`Progress`] and call [`invert_with_progress`] instead.

pub use crate::core::InversionCore;
pub use crate::error::Error;
pub use crate::forward::ForwardSolver;
pub use crate::frequency::FrequencyGrid;
pub use crate::jacobian::{JacobianCalculator, PerturbationMethod};
pub use crate::model::{compute_layer_thicknesses, DataVector, LayeredModel};
pub use crate::optimizer::Optimizer;
pub use crate::params::InversionParams;
pub use crate::progress::{NoOpProgress, Progress};
pub use crate::random_model::{
    generate_random_model, generate_random_model_and_forward, RandomModelAndForward,
    RandomModelConfig,
};
pub use crate::regularization::RegularizationKind;
pub use crate::result::{InversionResult, Outcome};

mod core;
mod error;
/// 1-D MT forward modelling via recursive upward impedance propagation.
pub mod forward;
/// Generating the period/frequency grid an inversion runs over.
pub mod frequency;
/// Finite-difference sensitivity matrix for the Gauss-Newton loop.
pub mod jacobian;
/// The layered earth model and the MT response data vector.
mod model;
/// Inversion configuration.
mod params;
/// Observer interface for progress reporting and cancellation.
pub mod progress;
/// Synthesizing a random smoothed layered model and its forward response.
pub mod random_model;
/// Model-space roughening operator for Tikhonov regularization.
pub mod regularization;
/// Solving the damped Gauss-Newton normal equations.
pub mod optimizer;
/// The outcome of a completed (or cancelled, or failed) inversion run.
mod result;

/// Run an inversion with no progress reporting and no way to cancel.
///
/// Every failure mode (invalid configuration, solver failure) is reported
/// through the returned [`InversionResult::outcome`] and
/// [`InversionResult::error_message`] rather than as an `Err`: there is no
/// partial work to lose, so a plain result is more useful than a `Result`.
pub fn invert(params: InversionParams) -> InversionResult {
    InversionCore::new().invert(&params, &mut NoOpProgress)
}

/// Just like [`invert`], but reports per-iteration progress to `progress`
/// and polls [`Progress::should_cancel`] once between each iteration.
pub fn invert_with_progress(params: InversionParams, progress: &mut dyn Progress) -> InversionResult {
    InversionCore::new().invert(&params, progress)
}
