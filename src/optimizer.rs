//! Solving the damped Gauss-Newton normal equations.

use faer::prelude::Solve;
use faer::{Col, Mat, Side};

use crate::Error;

/// Solves `(J^T*J + lambda*L^T*L) * dm = J^T*r` for the model update `dm`,
/// preferring a Cholesky factorization (the matrix is symmetric and, for a
/// sane `lambda > 0`, positive definite) and falling back to LU with
/// partial pivoting when Cholesky fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct Optimizer;

impl Optimizer {
    /// `J^T * J`, an `M x M` symmetric matrix.
    pub fn compute_jtj(&self, j: &Mat<f64>) -> Mat<f64> {
        j.transpose() * j
    }

    /// `J^T * r`, an `M`-length vector.
    pub fn compute_jtr(&self, j: &Mat<f64>, r: &[f64]) -> Col<f64> {
        let r = Col::from_fn(r.len(), |i| r[i]);
        j.transpose() * r
    }

    /// Solve the damped normal equations. `lambda` must be finite and
    /// non-negative, and `jtr` must be entirely finite, otherwise
    /// [`Error::InvalidConfiguration`] is returned. If both the Cholesky
    /// and LU paths fail to produce a finite solution,
    /// [`Error::SolverFailure`] is returned.
    pub fn solve(
        &self,
        jtj: &Mat<f64>,
        ltl: &Mat<f64>,
        lambda: f64,
        jtr: &Col<f64>,
    ) -> Result<Col<f64>, Error> {
        let m = jtr.nrows();
        if jtj.nrows() != m || jtj.ncols() != m || ltl.nrows() != m || ltl.ncols() != m {
            return Err(Error::InvalidConfiguration(
                "JtJ, LtL and JtR must all share the same dimension M".to_string(),
            ));
        }
        if !(lambda.is_finite() && lambda >= 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "lambda must be finite and non-negative, got {lambda}"
            )));
        }
        if jtr.iter().any(|x| !x.is_finite()) {
            return Err(Error::InvalidConfiguration(
                "JtR contains a non-finite entry".to_string(),
            ));
        }

        let a = jtj + faer::Scale(lambda) * ltl;
        if (0..m)
            .flat_map(|i| (0..m).map(move |j| (i, j)))
            .any(|(i, j)| !a[(i, j)].is_finite())
        {
            return Err(Error::SolverFailure);
        }

        if let Ok(llt) = a.as_ref().llt(Side::Lower) {
            let dm = llt.solve(jtr);
            if dm.iter().all(|x| x.is_finite()) {
                return Ok(dm);
            }
        }

        let lu = a.as_ref().partial_piv_lu();
        let dm = lu.solve(jtr);
        if dm.iter().all(|x| x.is_finite()) {
            Ok(dm)
        } else {
            Err(Error::SolverFailure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_a_well_conditioned_system() {
        let jtj = Mat::from_fn(2, 2, |i, j| if i == j { 4.0 } else { 0.0 });
        let ltl = Mat::from_fn(2, 2, |i, j| if i == j { 1.0 } else { 0.0 });
        let jtr = Col::from_fn(2, |i| if i == 0 { 8.0 } else { 10.0 });
        let optimizer = Optimizer;
        let dm = optimizer.solve(&jtj, &ltl, 1.0, &jtr).unwrap();
        assert!((dm[0] - 1.6).abs() < 1e-9);
        assert!((dm[1] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_negative_lambda() {
        let jtj = Mat::from_fn(2, 2, |i, j| if i == j { 1.0 } else { 0.0 });
        let ltl = jtj.clone();
        let jtr = Col::from_fn(2, |_| 1.0);
        let optimizer = Optimizer;
        assert!(optimizer.solve(&jtj, &ltl, -1.0, &jtr).is_err());
    }

    #[test]
    fn rejects_non_finite_jtr() {
        let jtj = Mat::from_fn(2, 2, |i, j| if i == j { 1.0 } else { 0.0 });
        let ltl = jtj.clone();
        let jtr = Col::from_fn(2, |i| if i == 0 { f64::NAN } else { 1.0 });
        let optimizer = Optimizer;
        assert!(optimizer.solve(&jtj, &ltl, 1.0, &jtr).is_err());
    }

    #[test]
    fn falls_back_to_lu_for_a_non_pd_matrix() {
        // JtJ is rank-deficient (all zero) and LtL is zero, lambda zero:
        // A is the zero matrix, singular under both Cholesky and LU,
        // so the solve should fail cleanly rather than panicking.
        let jtj = Mat::from_fn(2, 2, |_, _| 0.0);
        let ltl = Mat::from_fn(2, 2, |_, _| 0.0);
        let jtr = Col::from_fn(2, |_| 1.0);
        let optimizer = Optimizer;
        assert!(optimizer.solve(&jtj, &ltl, 0.0, &jtr).is_err());
    }
}
