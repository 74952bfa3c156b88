//! The outcome of a completed (or cancelled, or failed) inversion run.

/// How an inversion run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// `||dm|| < tol_dm` before `max_iter` was reached.
    Converged,
    /// `max_iter` iterations completed without reaching `tol_dm`.
    MaxIterReached,
    /// The optimizer could not factor the damped normal equations.
    SolverFailed,
    /// The caller's [`crate::Progress::should_cancel`] returned `true`.
    Cancelled,
}

/// Everything a run of [`crate::invert`] / [`crate::invert_with_progress`]
/// produces: the models involved, the data, and the convergence history.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub struct InversionResult {
    /// How the run ended.
    pub outcome: Outcome,
    /// Number of completed Gauss-Newton iterations.
    pub n_iterations: usize,
    /// Truth model (`log10(rho)` per layer), provided or synthesized.
    pub m_true: Vec<f64>,
    /// Initial model (`log10(rho)` per layer), always uniform `log10(100)`.
    pub m_init: Vec<f64>,
    /// Final model (`log10(rho)` per layer) after the last applied update.
    pub m_final: Vec<f64>,
    /// Per-layer thickness, metres.
    pub layer_thicknesses: Vec<f64>,
    /// Per-layer top depth, metres, from the surface.
    pub layer_depths: Vec<f64>,
    /// Periods, seconds.
    pub periods: Vec<f64>,
    /// Angular frequencies, radians/second.
    pub omega: Vec<f64>,
    /// Observed data (`log10(rho_a)`/phase interleaved), provided or
    /// synthesized with noise.
    pub d_obs: Vec<f64>,
    /// Synthetic data from `m_final`.
    pub d_syn: Vec<f64>,
    /// `||d_obs - d_syn||` recorded before each iteration's update.
    pub residual_history: Vec<f64>,
    /// `||dm||` recorded after each iteration's update.
    pub dm_norm_history: Vec<f64>,
    /// Human-readable explanation, populated when `outcome` isn't
    /// [`Outcome::Converged`]/[`Outcome::MaxIterReached`].
    pub error_message: Option<String>,
}

impl InversionResult {
    /// True for [`Outcome::Converged`] and [`Outcome::MaxIterReached`] --
    /// both represent a usable `m_final`, distinguishing them from a run
    /// that aborted without a complete answer.
    pub fn success(&self) -> bool {
        matches!(self.outcome, Outcome::Converged | Outcome::MaxIterReached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(outcome: Outcome) -> InversionResult {
        InversionResult {
            outcome,
            n_iterations: 0,
            m_true: Vec::new(),
            m_init: Vec::new(),
            m_final: Vec::new(),
            layer_thicknesses: Vec::new(),
            layer_depths: Vec::new(),
            periods: Vec::new(),
            omega: Vec::new(),
            d_obs: Vec::new(),
            d_syn: Vec::new(),
            residual_history: Vec::new(),
            dm_norm_history: Vec::new(),
            error_message: None,
        }
    }

    #[test]
    fn converged_and_max_iter_count_as_success() {
        assert!(sample(Outcome::Converged).success());
        assert!(sample(Outcome::MaxIterReached).success());
    }

    #[test]
    fn solver_failure_and_cancellation_do_not_count_as_success() {
        assert!(!sample(Outcome::SolverFailed).success());
        assert!(!sample(Outcome::Cancelled).success());
    }
}
