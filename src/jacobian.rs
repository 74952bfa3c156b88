//! Finite-difference sensitivity matrix for the Gauss-Newton loop.

use faer::Mat;

use crate::forward::ForwardSolver;
use crate::model::{finite_or, DataVector};
use crate::Error;

/// Which finite-difference scheme [`JacobianCalculator::compute`] uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PerturbationMethod {
    /// `J[:,j] = (d(m + eps*e_j) - d(m)) / eps`. One extra forward
    /// evaluation per model parameter.
    #[default]
    Forward,
    /// `J[:,j] = (d(m + eps*e_j) - d(m - eps*e_j)) / (2*eps)`. Two extra
    /// forward evaluations per model parameter, more accurate.
    Central,
}

/// Computes the Jacobian of the forward response with respect to the model
/// parameters by finite-difference perturbation, delegating every forward
/// evaluation to a [`ForwardSolver`].
#[derive(Clone, Copy, Debug, Default)]
pub struct JacobianCalculator {
    /// Perturbation scheme to use.
    pub method: PerturbationMethod,
}

impl JacobianCalculator {
    /// Build a calculator using the given perturbation method.
    pub fn new(method: PerturbationMethod) -> Self {
        Self { method }
    }

    /// Compute the Jacobian at model `m`, given the current synthetic data
    /// `d_syn = solver.solve(m, omega, thicknesses)` and a perturbation
    /// step `epsilon`. Returns a dense `(2*n_freq) x M` matrix.
    ///
    /// `epsilon` must be finite and positive, otherwise
    /// [`Error::InvalidConfiguration`] is returned. Never mutates the
    /// caller's model; perturbations are applied to an owned copy and
    /// restored after each column.
    pub fn compute(
        &self,
        solver: &ForwardSolver,
        m: &[f64],
        omega: &[f64],
        d_syn: &DataVector,
        thicknesses: &[f64],
        epsilon: f64,
    ) -> Result<Mat<f64>, Error> {
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "epsilon must be positive and finite, got {epsilon}"
            )));
        }

        let num_layers = m.len();
        let num_data = d_syn.0.len();
        let mut jacobian = Mat::zeros(num_data, num_layers);
        let mut m_perturbed = m.to_vec();

        match self.method {
            PerturbationMethod::Forward => {
                for j in 0..num_layers {
                    m_perturbed[j] = m[j] + epsilon;
                    let d_perturbed = solver.solve(&m_perturbed, omega, thicknesses);
                    for i in 0..num_data {
                        let diff = (d_perturbed.0[i] - d_syn.0[i]) / epsilon;
                        jacobian[(i, j)] = finite_or(diff, 0.0);
                    }
                    m_perturbed[j] = m[j];
                }
            }
            PerturbationMethod::Central => {
                let denom = 2.0 * epsilon;
                for j in 0..num_layers {
                    m_perturbed[j] = m[j] + epsilon;
                    let d_pos = solver.solve(&m_perturbed, omega, thicknesses);
                    m_perturbed[j] = m[j] - epsilon;
                    let d_neg = solver.solve(&m_perturbed, omega, thicknesses);
                    for i in 0..num_data {
                        let diff = (d_pos.0[i] - d_neg.0[i]) / denom;
                        jacobian[(i, j)] = finite_or(diff, 0.0);
                    }
                    m_perturbed[j] = m[j];
                }
            }
        }

        Ok(jacobian)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency;
    use crate::model::compute_layer_thicknesses;

    #[test]
    fn forward_and_central_agree_to_first_order() {
        let grid = frequency::generate(5, 0.1, 10.0).unwrap();
        let (thicknesses, _) = compute_layer_thicknesses(4, 50.0, 1.3);
        let m = vec![2.0, 1.5, 2.5, 1.8];
        let solver = ForwardSolver;
        let d_syn = solver.solve(&m, &grid.omega, &thicknesses);

        let forward = JacobianCalculator::new(PerturbationMethod::Forward)
            .compute(&solver, &m, &grid.omega, &d_syn, &thicknesses, 1e-5)
            .unwrap();
        let central = JacobianCalculator::new(PerturbationMethod::Central)
            .compute(&solver, &m, &grid.omega, &d_syn, &thicknesses, 1e-5)
            .unwrap();

        for i in 0..forward.nrows() {
            for j in 0..forward.ncols() {
                assert!(
                    (forward[(i, j)] - central[(i, j)]).abs() < 1e-3,
                    "mismatch at ({i},{j}): forward={}, central={}",
                    forward[(i, j)],
                    central[(i, j)]
                );
            }
        }
    }

    #[test]
    fn rejects_non_positive_epsilon() {
        let grid = frequency::generate(5, 0.1, 10.0).unwrap();
        let (thicknesses, _) = compute_layer_thicknesses(4, 50.0, 1.3);
        let m = vec![2.0; 4];
        let solver = ForwardSolver;
        let d_syn = solver.solve(&m, &grid.omega, &thicknesses);
        let calc = JacobianCalculator::default();
        assert!(calc
            .compute(&solver, &m, &grid.omega, &d_syn, &thicknesses, 0.0)
            .is_err());
        assert!(calc
            .compute(&solver, &m, &grid.omega, &d_syn, &thicknesses, f64::NAN)
            .is_err());
    }

    #[test]
    fn perturbation_does_not_mutate_caller_model() {
        let grid = frequency::generate(5, 0.1, 10.0).unwrap();
        let (thicknesses, _) = compute_layer_thicknesses(3, 50.0, 1.3);
        let m = vec![2.0, 1.0, 3.0];
        let original = m.clone();
        let solver = ForwardSolver;
        let d_syn = solver.solve(&m, &grid.omega, &thicknesses);
        let calc = JacobianCalculator::default();
        let _ = calc
            .compute(&solver, &m, &grid.omega, &d_syn, &thicknesses, 1e-5)
            .unwrap();
        assert_eq!(m, original);
    }
}
