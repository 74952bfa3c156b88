//! The layered earth model and the MT response data vector.

/// A 1-D layered earth model: per-layer thickness and log-resistivity.
///
/// `m[i] = log10(rho_i)`, one value per layer. `thicknesses[i]` is the
/// layer's vertical extent in metres; the deepest layer's thickness is
/// carried for symmetry with [`Self::depths`] but the forward recursion
/// treats the deepest layer as a half-space and never reads it.
#[derive(Clone, Debug, PartialEq)]
pub struct LayeredModel {
    /// `log10(rho)` per layer.
    pub m: Vec<f64>,
    /// Layer thickness in metres, same length as `m`.
    pub thicknesses: Vec<f64>,
}

impl LayeredModel {
    /// Build a model from log-resistivities and thicknesses of equal length.
    pub fn new(m: Vec<f64>, thicknesses: Vec<f64>) -> Self {
        debug_assert_eq!(m.len(), thicknesses.len());
        Self { m, thicknesses }
    }

    /// Number of layers.
    pub fn num_layers(&self) -> usize {
        self.m.len()
    }

    /// Cumulative depth to the top of each layer, starting at 0 at the surface.
    pub fn depths(&self) -> Vec<f64> {
        let mut depths = Vec::with_capacity(self.thicknesses.len());
        let mut depth = 0.0;
        for &h in &self.thicknesses {
            depths.push(depth);
            depth += h;
        }
        depths
    }
}

/// Per-layer thickness that grows geometrically from the surface.
///
/// `thicknesses[i] = first * growth^i`, `depths[i]` is the running sum
/// of the thicknesses above it.
pub fn compute_layer_thicknesses(
    num_layers: usize,
    first_thickness: f64,
    growth: f64,
) -> (Vec<f64>, Vec<f64>) {
    let mut thicknesses = Vec::with_capacity(num_layers);
    let mut depths = Vec::with_capacity(num_layers);
    let mut current_thickness = first_thickness;
    let mut current_depth = 0.0;
    for _ in 0..num_layers {
        thicknesses.push(current_thickness);
        depths.push(current_depth);
        current_depth += current_thickness;
        current_thickness *= growth;
    }
    (thicknesses, depths)
}

/// An MT response vector: `log10(apparent resistivity)` and phase (degrees)
/// interleaved per frequency.
///
/// Element `2*k` is `log10(rho_a)` at frequency `k`, element `2*k+1` is the
/// phase in degrees at frequency `k`. This ordering is load-bearing: every
/// Jacobian row and every residual vector shares it, so call sites should
/// go through [`Self::rho_log10`] / [`Self::phase_deg`] rather than
/// hand-indexing.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct DataVector(pub Vec<f64>);

impl DataVector {
    /// Build a zeroed response vector for `n_freq` frequencies.
    pub fn zeros(n_freq: usize) -> Self {
        Self(vec![0.0; n_freq * 2])
    }

    /// Number of frequencies this vector covers.
    pub fn n_freq(&self) -> usize {
        self.0.len() / 2
    }

    /// `log10(apparent resistivity)` at frequency index `k`.
    pub fn rho_log10(&self, k: usize) -> f64 {
        self.0[2 * k]
    }

    /// Phase in degrees at frequency index `k`.
    pub fn phase_deg(&self, k: usize) -> f64 {
        self.0[2 * k + 1]
    }

    /// Mutable access to the `log10(apparent resistivity)` slot at frequency `k`.
    pub fn rho_log10_mut(&mut self, k: usize) -> &mut f64 {
        &mut self.0[2 * k]
    }

    /// Mutable access to the phase slot at frequency `k`.
    pub fn phase_deg_mut(&mut self, k: usize) -> &mut f64 {
        &mut self.0[2 * k + 1]
    }

    /// Euclidean norm, treating non-finite entries as excluded in the spirit
    /// of [`sanitize_response`] -- callers should have already sanitized,
    /// this just guards against stray `NaN` propagation into the norm itself.
    pub fn norm(&self) -> f64 {
        let sum_sq: f64 = self.0.iter().map(|x| x * x).sum();
        let n = sum_sq.sqrt();
        finite_or(n, 0.0)
    }
}

/// Replace `x` with `default` if `x` is not finite.
pub fn finite_or(x: f64, default: f64) -> f64 {
    if x.is_finite() { x } else { default }
}

/// Clamp a single `(log10(rho_a), phase_deg)` pair to the recursive
/// forward solver's defensive defaults: non-finite apparent resistivity
/// becomes `1e-10` (so its log10 is `-10`), non-finite phase becomes `0`.
pub fn sanitize_response(rho_log10: f64, phase_deg: f64) -> (f64, f64) {
    let rho_log10 = if rho_log10.is_finite() {
        rho_log10
    } else {
        -10.0
    };
    let phase_deg = finite_or(phase_deg, 0.0);
    (rho_log10, phase_deg)
}
