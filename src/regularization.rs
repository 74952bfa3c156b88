//! Model-space roughening operator for Tikhonov regularization.

use faer::Mat;

/// Which roughening operator [`build_l_matrix`] constructs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegularizationKind {
    /// Second-difference operator, `(M-2) x M`, rows `[1, -2, 1]`. Penalizes
    /// model curvature; the default.
    #[default]
    Smoothness,
    /// First-difference operator, `(M-1) x M`, rows `[-1, 1]`. Penalizes
    /// layer-to-layer jumps.
    Flatness,
    /// Identity, `M x M`. Penalizes deviation from zero (minimum-norm).
    MinimumNorm,
}

/// Build the roughening matrix `L` for a model with `num_layers` parameters.
///
/// `num_layers` must be at least 3 for [`RegularizationKind::Smoothness`]
/// and at least 2 for [`RegularizationKind::Flatness`]; both panic below
/// those sizes, same as indexing out of bounds would -- this is a
/// programmer error in wiring up `M`, not a runtime condition a caller
/// recovers from.
pub fn build_l_matrix(num_layers: usize, kind: RegularizationKind) -> Mat<f64> {
    match kind {
        RegularizationKind::Smoothness => {
            let rows = num_layers - 2;
            Mat::from_fn(rows, num_layers, |i, j| {
                if j == i {
                    1.0
                } else if j == i + 1 {
                    -2.0
                } else if j == i + 2 {
                    1.0
                } else {
                    0.0
                }
            })
        }
        RegularizationKind::Flatness => {
            let rows = num_layers - 1;
            Mat::from_fn(rows, num_layers, |i, j| {
                if j == i {
                    -1.0
                } else if j == i + 1 {
                    1.0
                } else {
                    0.0
                }
            })
        }
        RegularizationKind::MinimumNorm => {
            Mat::from_fn(num_layers, num_layers, |i, j| if i == j { 1.0 } else { 0.0 })
        }
    }
}

/// `L^T * L`, a symmetric positive-semidefinite `M x M` matrix. Depends only
/// on `L`'s shape and values, never on the current model, so callers build
/// it once per inversion run and reuse it across iterations.
pub fn compute_ltl(l: &Mat<f64>) -> Mat<f64> {
    l.transpose() * l
}
