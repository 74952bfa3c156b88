//! Inversion configuration.

use crate::jacobian::PerturbationMethod;
use crate::regularization::RegularizationKind;

/// Configuration for a single [`crate::invert`] / [`crate::invert_with_progress`] run.
///
/// All fields have defaults matching a well-known synthetic three-block
/// test case; override only what you need. When `d_obs`/`m_true` are both
/// provided (and correctly sized), they're used verbatim instead of
/// synthesizing a truth model and noisy observations. Likewise for
/// `periods`/`omega` as a pair, and `layer_thicknesses`/`layer_depths` as a
/// pair.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InversionParams {
    /// Number of layers in the model.
    pub m: usize,
    /// Number of frequencies.
    pub n_freq: usize,
    /// Jacobian finite-difference perturbation step.
    pub epsilon: f64,
    /// Maximum number of Gauss-Newton iterations.
    pub max_iter: usize,
    /// Convergence tolerance on `||dm||`.
    pub tol_dm: f64,
    /// Tikhonov regularization weight.
    pub lambda: f64,
    /// Thickness of the shallowest layer, metres.
    pub first_layer_thickness: f64,
    /// Geometric growth factor applied to each successive layer's thickness.
    pub thickness_growth: f64,
    /// Finite-difference scheme for the Jacobian.
    pub perturbation_method: PerturbationMethod,
    /// Roughening operator for the regularization term.
    pub regularization_kind: RegularizationKind,
    /// Shortest period, seconds, used when `periods`/`omega` aren't provided.
    pub t_min: f64,
    /// Longest period, seconds, used when `periods`/`omega` aren't provided.
    pub t_max: f64,
    /// Observed data, `2 * n_freq` long. If provided together with
    /// `m_true` (correctly sized), used verbatim instead of synthesizing.
    pub d_obs: Option<Vec<f64>>,
    /// Truth model, `m` long, paired with `d_obs`.
    pub m_true: Option<Vec<f64>>,
    /// Periods, `n_freq` long, paired with `omega`.
    pub periods: Option<Vec<f64>>,
    /// Angular frequencies, `n_freq` long, paired with `periods`.
    pub omega: Option<Vec<f64>>,
    /// Layer thicknesses, `m` long, paired with `layer_depths`.
    pub layer_thicknesses: Option<Vec<f64>>,
    /// Layer depths, `m` long, paired with `layer_thicknesses`.
    pub layer_depths: Option<Vec<f64>>,
}

impl Default for InversionParams {
    fn default() -> Self {
        Self {
            m: 40,
            n_freq: 61,
            epsilon: 1e-5,
            max_iter: 20,
            tol_dm: 1e-4,
            lambda: 1.0,
            first_layer_thickness: 10.0,
            thickness_growth: 1.2,
            perturbation_method: PerturbationMethod::Forward,
            regularization_kind: RegularizationKind::Smoothness,
            t_min: crate::frequency::DEFAULT_T_MIN,
            t_max: crate::frequency::DEFAULT_T_MAX,
            d_obs: None,
            m_true: None,
            periods: None,
            omega: None,
            layer_thicknesses: None,
            layer_depths: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_the_canonical_test_case() {
        let p = InversionParams::default();
        assert_eq!(p.m, 40);
        assert_eq!(p.n_freq, 61);
        assert_eq!(p.max_iter, 20);
        assert!((p.lambda - 1.0).abs() < 1e-12);
    }
}
