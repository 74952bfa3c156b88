//! 1-D MT forward modelling via recursive upward impedance propagation.

use num_complex::Complex64;

use crate::model::{sanitize_response, DataVector};

/// Vacuum permeability, H/m.
pub const MU0: f64 = 4e-7 * std::f64::consts::PI;

/// Below this squared magnitude, a complex denominator is treated as
/// degenerate and the dependent ratio is replaced with `1 + 0j`, matching
/// the original recursive-impedance implementation's guard against
/// dividing by a near-zero complex number.
const DEGENERATE_MAGNITUDE_SQUARED: f64 = 1e-20;

/// Computes the 1-D MT response of a layered model by recursively
/// propagating the surface impedance upward from the half-space below the
/// deepest layer.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardSolver;

impl ForwardSolver {
    /// Compute `log10(apparent resistivity)` and phase (degrees) at every
    /// frequency in `omega`, for a model with log-resistivities `m_log_rho`
    /// and per-layer thicknesses `thicknesses` (same length as `m_log_rho`;
    /// the last entry is unused, the deepest layer is a half-space).
    pub fn solve(&self, m_log_rho: &[f64], omega: &[f64], thicknesses: &[f64]) -> DataVector {
        let sigma = compute_conductivity(m_log_rho);
        let mut data = DataVector::zeros(omega.len());
        for (k, &w) in omega.iter().enumerate() {
            let z_surface = recursive_impedance(w, &sigma, thicknesses);
            let (rho_log10, phase_deg) = surface_response(w, z_surface);
            let (rho_log10, phase_deg) = sanitize_response(rho_log10, phase_deg);
            *data.rho_log10_mut(k) = rho_log10;
            *data.phase_deg_mut(k) = phase_deg;
        }
        data
    }
}

/// `sigma_i = 1 / 10^(m_i)`, computed as `1 / exp(m_i * ln(10))`.
fn compute_conductivity(m_log_rho: &[f64]) -> Vec<f64> {
    let ln10 = std::f64::consts::LN_10;
    m_log_rho
        .iter()
        .map(|&m| {
            let rho = (m * ln10).exp();
            1.0 / rho
        })
        .collect()
}

/// Recursively propagate the impedance from the half-space beneath the
/// deepest layer up to the surface, for angular frequency `w`.
fn recursive_impedance(w: f64, sigma: &[f64], dz: &[f64]) -> Complex64 {
    let degenerate = Complex64::new(1e-10, 1e-10);
    let m = sigma.len();
    if m == 0 || w <= 0.0 || sigma[m - 1] <= 0.0 {
        return degenerate;
    }

    let half_space_term = half_space_impedance(w, sigma[m - 1]);
    let Some(mut z_current) = half_space_term else {
        return degenerate;
    };

    for i in (0..m - 1).rev() {
        if sigma[i] <= 0.0 || dz[i] <= 0.0 || !dz[i].is_finite() {
            continue;
        }
        let Some(z0_i) = characteristic_impedance(w, sigma[i]) else {
            continue;
        };
        let Some(k_i) = wavenumber(w, sigma[i]) else {
            continue;
        };
        let kd = k_i * dz[i];
        let tanh_kd = stable_tanh(kd);

        let numerator = z_current + z0_i * tanh_kd;
        let denominator = z0_i + z_current * tanh_kd;
        let ratio = stable_divide(numerator, denominator);
        z_current = z0_i * ratio;
    }

    z_current
}

/// `Z_bottom = (1+j) * sqrt(w*mu0 / (2*sigma))` for the half-space beneath
/// the deepest layer.
fn half_space_impedance(w: f64, sigma_bottom: f64) -> Option<Complex64> {
    characteristic_impedance(w, sigma_bottom)
}

/// Layer characteristic impedance `Z0_i = (1+j) * sqrt(w*mu0 / (2*sigma_i))`.
fn characteristic_impedance(w: f64, sigma: f64) -> Option<Complex64> {
    let denom = 2.0 * sigma;
    if denom <= 0.0 || !denom.is_finite() {
        return None;
    }
    let magnitude = (w * MU0 / denom).sqrt();
    let magnitude = if magnitude.is_finite() { magnitude } else { 1e-10 };
    Some(Complex64::new(magnitude, magnitude))
}

/// Layer wavenumber `k_i = (1+j) * sqrt(w*mu0*sigma_i / 2)`.
fn wavenumber(w: f64, sigma: f64) -> Option<Complex64> {
    let arg = w * MU0 * sigma / 2.0;
    if arg < 0.0 || !arg.is_finite() {
        return None;
    }
    let magnitude = arg.sqrt();
    let magnitude = if magnitude.is_finite() { magnitude } else { 1e-10 };
    Some(Complex64::new(magnitude, magnitude))
}

/// `tanh(z)` computed from `sinh`/`cosh` built out of `exp(+-re)` and
/// `cos`/`sin` of the imaginary part, falling back to `1 + 0j` when the
/// `cosh` magnitude is too small to safely divide by. This mirrors the
/// original recursive-impedance implementation's explicit construction
/// rather than delegating to a library `tanh`, so the degeneracy threshold
/// stays an auditable constant.
fn stable_tanh(z: Complex64) -> Complex64 {
    let exp_pos = Complex64::new(z.re.exp(), 0.0) * Complex64::new(z.im.cos(), z.im.sin());
    let exp_neg = Complex64::new((-z.re).exp(), 0.0) * Complex64::new(z.im.cos(), -z.im.sin());
    let sinh = (exp_pos - exp_neg) * 0.5;
    let cosh = (exp_pos + exp_neg) * 0.5;
    stable_divide(sinh, cosh)
}

/// `numerator / denominator`, falling back to `1 + 0j` when `denominator`'s
/// squared magnitude is below [`DEGENERATE_MAGNITUDE_SQUARED`].
fn stable_divide(numerator: Complex64, denominator: Complex64) -> Complex64 {
    let denom_mag2 = denominator.norm_sqr();
    if denom_mag2 > DEGENERATE_MAGNITUDE_SQUARED {
        numerator * denominator.conj() / denom_mag2
    } else {
        Complex64::new(1.0, 0.0)
    }
}

/// `rho_a = |Z|^2 / (w*mu0)`, `phase = atan2(Im(Z), Re(Z))` in degrees.
fn surface_response(w: f64, z_surface: Complex64) -> (f64, f64) {
    let z_mag2 = z_surface.norm_sqr();
    let denom = w * MU0;
    let rho_a = if denom <= 0.0 || !denom.is_finite() || !z_mag2.is_finite() {
        1e-10
    } else {
        z_mag2 / denom
    };
    let rho_a = if rho_a.is_finite() && rho_a > 0.0 {
        rho_a
    } else {
        1e-10
    };
    let phase_deg = z_surface.im.atan2(z_surface.re) * 180.0 / std::f64::consts::PI;
    (rho_a.log10(), phase_deg)
}
