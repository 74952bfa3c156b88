//! Synthesizing a random smoothed layered model and its forward response.
//!
//! This is a self-test / demo input provider, not a general-purpose model
//! sampler: the smoothing and re-stretch steps below exist to produce a
//! plausible-looking layered earth, not to sample any particular
//! distribution over models.

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::forward::ForwardSolver;
use crate::model::{compute_layer_thicknesses, DataVector};

/// Below this, the smoothed range is considered degenerate relative to the
/// raw range, and the re-stretch step (below) kicks in.
const SMOOTHED_RANGE_FLOOR_FRACTION: f64 = 0.2;
/// Target fraction of the raw range the re-stretch step aims for.
const RESTRETCH_TARGET_RANGE_FRACTION: f64 = 0.45;

/// Configuration for [`generate_random_model`] / [`generate_random_model_and_forward`].
#[derive(Clone, Debug)]
pub struct RandomModelConfig {
    /// Number of layers.
    pub m: usize,
    /// Number of frequencies (only used by [`generate_random_model_and_forward`]).
    pub n_freq: usize,
    /// Minimum resistivity, ohm-metres.
    pub min_rho: f64,
    /// Maximum resistivity, ohm-metres.
    pub max_rho: f64,
    /// Thickness of the shallowest layer, metres.
    pub first_layer_thickness: f64,
    /// Geometric thickness growth factor.
    pub thickness_growth: f64,
    /// Smoothing window size as a fraction of `m`, in `(0, 1)`. `0` or
    /// outside that range disables smoothing entirely.
    pub filter_cutoff: f64,
    /// Explicit RNG seed. There is no time-seeded fallback: every call is
    /// fully reproducible given the same config.
    pub seed: u64,
}

impl Default for RandomModelConfig {
    fn default() -> Self {
        Self {
            m: 40,
            n_freq: 61,
            min_rho: 1.0,
            max_rho: 1000.0,
            first_layer_thickness: 10.0,
            thickness_growth: 1.2,
            filter_cutoff: 0.1,
            seed: 0xA5F3_1D2C,
        }
    }
}

/// A randomly generated model plus its forward response.
#[derive(Clone, Debug)]
pub struct RandomModelAndForward {
    /// `log10(rho)` per layer.
    pub m_log_rho: Vec<f64>,
    /// Per-layer thickness, metres.
    pub layer_thicknesses: Vec<f64>,
    /// Per-layer top depth, metres.
    pub layer_depths: Vec<f64>,
    /// Periods, seconds.
    pub periods: Vec<f64>,
    /// Angular frequencies, radians/second.
    pub omega: Vec<f64>,
    /// Forward response of `m_log_rho`.
    pub data: DataVector,
}

/// Draw a uniform-in-log-resistivity-space random model, then smooth it
/// with a two-pass Gaussian-weighted moving average so it looks like a
/// plausible layered earth rather than noise.
pub fn generate_random_model(cfg: &RandomModelConfig) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let log_min_rho = cfg.min_rho.log10();
    let log_max_rho = cfg.max_rho.log10();

    let raw_log_rho: Vec<f64> = (0..cfg.m)
        .map(|_| {
            let u: f64 = rng.gen_range(0.0..1.0);
            log_min_rho + u * (log_max_rho - log_min_rho)
        })
        .collect();

    if !(cfg.filter_cutoff > 0.0 && cfg.filter_cutoff < 1.0) {
        return raw_log_rho;
    }

    smooth(&raw_log_rho, cfg.m, cfg.filter_cutoff, log_min_rho, log_max_rho)
}

/// Two-pass Gaussian-weighted moving average, followed by a re-stretch of
/// the smoothed range if smoothing over-flattened the model.
fn smooth(
    raw_log_rho: &[f64],
    m: usize,
    filter_cutoff: f64,
    log_min_rho: f64,
    log_max_rho: f64,
) -> Vec<f64> {
    let mut window_size = (m as f64 * filter_cutoff * 2.0) as i64;
    window_size = window_size.max(3).min(m as i64);
    let sigma = window_size as f64 / 3.0;

    let gaussian_weighted_average = |values: &[f64], half_window: i64| -> Vec<f64> {
        (0..m as i64)
            .map(|i| {
                let mut sum = 0.0;
                let mut weight_sum = 0.0;
                for j in -half_window..=half_window {
                    let idx = i + j;
                    if idx >= 0 && (idx as usize) < m {
                        let weight = (-((j * j) as f64) / (2.0 * sigma * sigma)).exp();
                        sum += values[idx as usize] * weight;
                        weight_sum += weight;
                    }
                }
                if weight_sum > 1e-10 {
                    sum / weight_sum
                } else {
                    values[i as usize]
                }
            })
            .collect()
    };

    let filtered = gaussian_weighted_average(raw_log_rho, window_size / 2);
    let mut smoothed = gaussian_weighted_average(&filtered, window_size / 4);

    let (smoothed_min, smoothed_max) = min_max(&smoothed);
    let (raw_min, raw_max) = min_max(raw_log_rho);

    if smoothed_max > smoothed_min + 1e-6 && raw_max > raw_min + 1e-6 {
        let smoothed_range = smoothed_max - smoothed_min;
        let raw_range = raw_max - raw_min;
        if smoothed_range < raw_range * SMOOTHED_RANGE_FLOOR_FRACTION {
            let target_range = raw_range * RESTRETCH_TARGET_RANGE_FRACTION;
            let smoothed_center = (smoothed_min + smoothed_max) / 2.0;
            let raw_center = (raw_min + raw_max) / 2.0;
            let scale = target_range / smoothed_range;
            for v in &mut smoothed {
                *v = raw_center + (*v - smoothed_center) * scale;
                *v = v.clamp(log_min_rho, log_max_rho);
            }
        }
    }

    smoothed
}

fn min_max(values: &[f64]) -> (f64, f64) {
    let mut min = values[0];
    let mut max = values[0];
    for &v in &values[1..] {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    (min, max)
}

/// Generate a random smoothed model, a geometric thickness schedule, a
/// frequency grid, and the model's forward response, all from one config.
pub fn generate_random_model_and_forward(cfg: RandomModelConfig) -> RandomModelAndForward {
    let (layer_thicknesses, layer_depths) =
        compute_layer_thicknesses(cfg.m, cfg.first_layer_thickness, cfg.thickness_growth);
    let m_log_rho = generate_random_model(&cfg);
    let grid = crate::frequency::generate(
        cfg.n_freq,
        crate::frequency::DEFAULT_T_MIN,
        crate::frequency::DEFAULT_T_MAX,
    )
    .expect("default frequency range is always valid");
    let data = ForwardSolver.solve(&m_log_rho, &grid.omega, &layer_thicknesses);

    RandomModelAndForward {
        m_log_rho,
        layer_thicknesses,
        layer_depths,
        periods: grid.periods,
        omega: grid.omega,
        data,
    }
}

/// Add zero-mean Gaussian noise to `data`, with per-element standard
/// deviation `noise_level * |data[i]|`, using a seeded RNG so synthetic
/// observations are reproducible.
pub fn add_gaussian_noise(data: &mut [f64], noise_level: f64, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for value in data.iter_mut() {
        let stddev = noise_level * value.abs();
        if stddev > 0.0 {
            let normal = Normal::new(0.0, stddev).expect("stddev is positive and finite");
            *value += normal.sample(&mut rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_random_model_is_deterministic_given_a_seed() {
        let cfg = RandomModelConfig::default();
        let a = generate_random_model(&cfg);
        let b = generate_random_model(&cfg);
        assert_eq!(a, b);
    }

    #[test]
    fn generate_random_model_stays_within_bounds() {
        let cfg = RandomModelConfig {
            filter_cutoff: 0.0,
            ..RandomModelConfig::default()
        };
        let m = generate_random_model(&cfg);
        let log_min = cfg.min_rho.log10();
        let log_max = cfg.max_rho.log10();
        for v in m {
            assert!(v >= log_min - 1e-9 && v <= log_max + 1e-9);
        }
    }

    #[test]
    fn different_seeds_produce_different_models() {
        let cfg_a = RandomModelConfig {
            seed: 1,
            ..RandomModelConfig::default()
        };
        let cfg_b = RandomModelConfig {
            seed: 2,
            ..RandomModelConfig::default()
        };
        assert_ne!(generate_random_model(&cfg_a), generate_random_model(&cfg_b));
    }

    #[test]
    fn add_gaussian_noise_is_deterministic_given_a_seed() {
        let mut a = vec![1.0, 2.0, 3.0];
        let mut b = a.clone();
        add_gaussian_noise(&mut a, 0.02, 42);
        add_gaussian_noise(&mut b, 0.02, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn generate_random_model_and_forward_produces_finite_data() {
        let cfg = RandomModelConfig {
            m: 10,
            n_freq: 15,
            ..RandomModelConfig::default()
        };
        let result = generate_random_model_and_forward(cfg);
        assert_eq!(result.m_log_rho.len(), 10);
        assert_eq!(result.data.n_freq(), 15);
        for &x in &result.data.0 {
            assert!(x.is_finite());
        }
    }
}
