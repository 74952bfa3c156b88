//! The Gauss-Newton inversion loop, coordinating all other components.

use crate::error::Error;
use crate::forward::ForwardSolver;
use crate::jacobian::JacobianCalculator;
use crate::model::{compute_layer_thicknesses, finite_or, DataVector, LayeredModel};
use crate::optimizer::Optimizer;
use crate::params::InversionParams;
use crate::progress::Progress;
use crate::random_model::add_gaussian_noise;
use crate::regularization::{build_l_matrix, compute_ltl};
use crate::result::{InversionResult, Outcome};

/// Uniform starting resistivity, ohm-metres, `log10(100) = 2`.
const INITIAL_RHO: f64 = 100.0;
/// Noise level applied to synthesized observations (2%).
const SYNTHETIC_NOISE_LEVEL: f64 = 0.02;
/// Seed used for the synthetic-observation noise; there is no time-seeded
/// fallback, every self-test run is reproducible.
const SYNTHETIC_NOISE_SEED: u64 = 12_345;

/// Coordinates [`ForwardSolver`], [`JacobianCalculator`], the
/// regularization operator, and [`Optimizer`] to run a damped
/// Gauss-Newton inversion.
#[derive(Clone, Copy, Debug, Default)]
pub struct InversionCore {
    forward_solver: ForwardSolver,
    optimizer: Optimizer,
}

impl InversionCore {
    /// Build a coordinator with default component instances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run an inversion, reporting progress and allowing cancellation via
    /// `progress`.
    pub fn invert(&self, params: &InversionParams, progress: &mut dyn Progress) -> InversionResult {
        match self.try_invert(params, progress) {
            Ok(result) => result,
            Err((error, partial)) => partial.finish_with_error(error),
        }
    }

    fn try_invert(
        &self,
        params: &InversionParams,
        progress: &mut dyn Progress,
    ) -> Result<InversionResult, (Error, PartialResult)> {
        if params.m < 3 {
            return Err((
                Error::InvalidConfiguration(format!("m must be at least 3, got {}", params.m)),
                PartialResult::empty(),
            ));
        }

        let n_data = params.n_freq * 2;

        let (periods, omega, freqs_supplied) =
            resolve_frequencies(params).map_err(|e| (e, PartialResult::empty()))?;
        let (layer_thicknesses, layer_depths, layers_supplied) = resolve_layers(params);

        let mut partial = PartialResult::empty();
        partial.periods = periods.clone();
        partial.omega = omega.clone();
        partial.layer_thicknesses = layer_thicknesses.clone();
        partial.layer_depths = layer_depths.clone();

        let (m_true, d_obs) = resolve_truth_and_observations(
            self,
            params,
            n_data,
            freqs_supplied,
            layers_supplied,
            &omega,
            &layer_thicknesses,
        )
        .map_err(|e| (e, partial.clone()))?;
        partial.m_true = m_true.clone();
        partial.d_obs = d_obs.clone();

        let m_init = vec![INITIAL_RHO.log10(); params.m];
        partial.m_init = m_init.clone();
        let mut model = LayeredModel::new(m_init.clone(), layer_thicknesses);

        let l = build_l_matrix(model.num_layers(), params.regularization_kind);
        let ltl = compute_ltl(&l);

        let jacobian_calc = JacobianCalculator::new(params.perturbation_method);

        let mut residual_history = Vec::with_capacity(params.max_iter);
        let mut dm_norm_history = Vec::with_capacity(params.max_iter);
        let mut n_iterations = 0;
        let mut outcome = Outcome::MaxIterReached;
        let mut error_message = None;

        for iter in 0..params.max_iter {
            let d_syn = self.forward_solver.solve(&model.m, &omega, &model.thicknesses);
            let r = residual(&d_obs, &d_syn);
            let residual_norm = finite_or(norm(&r), 0.0);
            residual_history.push(residual_norm);

            let jacobian = jacobian_calc
                .compute(&self.forward_solver, &model.m, &omega, &d_syn, &model.thicknesses, params.epsilon)
                .map_err(|e| (e, snapshot(&partial, &m_init, &model.m, &residual_history, &dm_norm_history, &d_syn)))?;

            let jtj = self.optimizer.compute_jtj(&jacobian);
            let jtr = self.optimizer.compute_jtr(&jacobian, &r);

            let dm = match self.optimizer.solve(&jtj, &ltl, params.lambda, &jtr) {
                Ok(dm) => dm,
                Err(e) => {
                    outcome = Outcome::SolverFailed;
                    error_message = Some(e.to_string());
                    n_iterations = iter;
                    break;
                }
            };

            let dm: Vec<f64> = dm.iter().map(|&x| finite_or(x, 0.0)).collect();
            let dm_norm = finite_or(norm(&dm), 0.0);
            dm_norm_history.push(dm_norm);

            for ((m_i, &dm_i), &m_init_i) in model.m.iter_mut().zip(dm.iter()).zip(m_init.iter()) {
                let updated = *m_i + dm_i;
                *m_i = if updated.is_finite() { updated } else { m_init_i };
            }

            progress.on_iteration(iter + 1, residual_norm, dm_norm);
            n_iterations = iter + 1;

            if progress.should_cancel() {
                outcome = Outcome::Cancelled;
                error_message = Some(Error::Cancelled { iterations: n_iterations }.to_string());
                break;
            }

            if dm_norm < params.tol_dm {
                outcome = Outcome::Converged;
                break;
            }
        }

        let d_syn_final = self.forward_solver.solve(&model.m, &omega, &model.thicknesses);

        Ok(InversionResult {
            outcome,
            n_iterations,
            m_true,
            m_init,
            m_final: model.m,
            layer_thicknesses: model.thicknesses,
            layer_depths,
            periods,
            omega,
            d_obs,
            d_syn: d_syn_final.0,
            residual_history,
            dm_norm_history,
            error_message,
        })
    }
}

/// Residual `r = d_obs - d_syn`, with any non-finite element zeroed.
fn residual(d_obs: &[f64], d_syn: &DataVector) -> Vec<f64> {
    d_obs
        .iter()
        .zip(d_syn.0.iter())
        .map(|(&o, &s)| finite_or(o - s, 0.0))
        .collect()
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Resolve the period/frequency grid, also reporting whether the caller's
/// own `periods`/`omega` were used as-is (`true`) versus a fresh grid being
/// generated from `t_min`/`t_max` (`false`).
fn resolve_frequencies(params: &InversionParams) -> Result<(Vec<f64>, Vec<f64>, bool), Error> {
    if let (Some(periods), Some(omega)) = (&params.periods, &params.omega) {
        if periods.len() == params.n_freq && omega.len() == params.n_freq {
            return Ok((periods.clone(), omega.clone(), true));
        }
    }
    let grid = crate::frequency::generate(params.n_freq, params.t_min, params.t_max)?;
    Ok((grid.periods, grid.omega, false))
}

/// Resolve the layer thickness/depth schedule, also reporting whether the
/// caller's own `layer_thicknesses`/`layer_depths` were used as-is (`true`)
/// versus a fresh geometric schedule being computed (`false`).
fn resolve_layers(params: &InversionParams) -> (Vec<f64>, Vec<f64>, bool) {
    if let (Some(thicknesses), Some(depths)) = (&params.layer_thicknesses, &params.layer_depths) {
        if thicknesses.len() == params.m && depths.len() == params.m {
            return (thicknesses.clone(), depths.clone(), true);
        }
    }
    let (thicknesses, depths) =
        compute_layer_thicknesses(params.m, params.first_layer_thickness, params.thickness_growth);
    (thicknesses, depths, false)
}

/// Use the caller's truth model and observations if both are provided and
/// correctly sized; otherwise synthesize the canonical three-block truth
/// model (shallow 100 ohm-m, mid 10 ohm-m, deep 1000 ohm-m) and add 2%
/// Gaussian noise to its forward response.
///
/// A caller-supplied `d_obs`/`m_true` pair is only honored when the
/// frequency grid and layer schedule it was computed against were
/// *also* caller-supplied (`freqs_supplied && layers_supplied`); otherwise
/// those observations would silently get paired with a freshly generated
/// grid or layer schedule they were never evaluated on, which is rejected
/// as a configuration error rather than produced as a mismatched result.
#[allow(clippy::too_many_arguments)]
fn resolve_truth_and_observations(
    core: &InversionCore,
    params: &InversionParams,
    n_data: usize,
    freqs_supplied: bool,
    layers_supplied: bool,
    omega: &[f64],
    layer_thicknesses: &[f64],
) -> Result<(Vec<f64>, Vec<f64>), Error> {
    if let (Some(d_obs), Some(m_true)) = (&params.d_obs, &params.m_true) {
        if d_obs.len() == n_data && m_true.len() == params.m {
            if !(freqs_supplied && layers_supplied) {
                return Err(Error::InvalidConfiguration(
                    "d_obs/m_true were provided but periods/omega or layer_thicknesses/layer_depths \
                     were not (or were mismatched in length); refusing to pair caller-supplied \
                     observations with a freshly generated frequency grid or layer schedule"
                        .to_string(),
                ));
            }
            return Ok((m_true.clone(), d_obs.clone()));
        }
    }

    let m_true = synthetic_truth_model(params.m);
    let mut d_obs = core.forward_solver.solve(&m_true, omega, layer_thicknesses).0;
    add_gaussian_noise(&mut d_obs, SYNTHETIC_NOISE_LEVEL, SYNTHETIC_NOISE_SEED);
    Ok((m_true, d_obs))
}

/// The default three-block truth model: a shallow 100 ohm-m block, a
/// middle 10 ohm-m block, and a deep 1000 ohm-m block. Block sizes are
/// `min(5, M/4)` and `min(10, M/2)` layers, with everything remaining
/// going to the deepest block.
fn synthetic_truth_model(m: usize) -> Vec<f64> {
    let n_layers_1 = 5.min(m / 4);
    let n_layers_2 = 10.min(m / 2);
    let mut model = vec![0.0; m];
    for v in model.iter_mut().take(n_layers_1) {
        *v = 100.0f64.log10();
    }
    for v in model.iter_mut().take((n_layers_1 + n_layers_2).min(m)).skip(n_layers_1) {
        *v = 10.0f64.log10();
    }
    for v in model.iter_mut().skip(n_layers_1 + n_layers_2) {
        *v = 1000.0f64.log10();
    }
    model
}

/// Fields accumulated so far, kept around so a mid-run failure can still
/// return a useful partial [`InversionResult`] instead of nothing.
#[derive(Clone, Debug, Default)]
struct PartialResult {
    periods: Vec<f64>,
    omega: Vec<f64>,
    layer_thicknesses: Vec<f64>,
    layer_depths: Vec<f64>,
    m_true: Vec<f64>,
    m_init: Vec<f64>,
    m_current: Vec<f64>,
    d_obs: Vec<f64>,
    d_syn: Vec<f64>,
    residual_history: Vec<f64>,
    dm_norm_history: Vec<f64>,
}

impl PartialResult {
    fn empty() -> Self {
        Self::default()
    }

    fn finish_with_error(self, error: Error) -> InversionResult {
        let outcome = match error {
            Error::Cancelled { .. } => Outcome::Cancelled,
            Error::InvalidConfiguration(_) | Error::SolverFailure => Outcome::SolverFailed,
        };
        InversionResult {
            outcome,
            n_iterations: self.residual_history.len(),
            m_true: self.m_true,
            m_init: self.m_init,
            m_final: self.m_current,
            layer_thicknesses: self.layer_thicknesses,
            layer_depths: self.layer_depths,
            periods: self.periods,
            omega: self.omega,
            d_obs: self.d_obs,
            d_syn: self.d_syn,
            residual_history: self.residual_history,
            dm_norm_history: self.dm_norm_history,
            error_message: Some(error.to_string()),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn snapshot(
    base: &PartialResult,
    m_init: &[f64],
    m_current: &[f64],
    residual_history: &[f64],
    dm_norm_history: &[f64],
    d_syn: &DataVector,
) -> PartialResult {
    let mut snap = base.clone();
    snap.m_init = m_init.to_vec();
    snap.m_current = m_current.to_vec();
    snap.residual_history = residual_history.to_vec();
    snap.dm_norm_history = dm_norm_history.to_vec();
    snap.d_syn = d_syn.0.clone();
    snap
}
