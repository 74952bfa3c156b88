//! Generating the period/frequency grid an inversion runs over.

use crate::Error;

/// Default number of frequencies (matches [`crate::InversionParams::n_freq`]'s default).
pub const DEFAULT_N_FREQ: usize = 61;
/// Default shortest period, seconds.
pub const DEFAULT_T_MIN: f64 = 0.001;
/// Default longest period, seconds.
pub const DEFAULT_T_MAX: f64 = 1000.0;

/// A log-uniformly spaced grid of periods and their angular frequencies.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrequencyGrid {
    /// Period in seconds, `periods.len() == omega.len()`.
    pub periods: Vec<f64>,
    /// Angular frequency in radians/second, `omega_k = 2*pi / periods[k]`.
    pub omega: Vec<f64>,
}

impl FrequencyGrid {
    /// Number of frequencies in the grid.
    pub fn n_freq(&self) -> usize {
        self.periods.len()
    }
}

/// Generate a log-uniformly spaced grid of `n_freq` periods between
/// `t_min` and `t_max` seconds (inclusive), and their angular frequencies.
///
/// Requires `n_freq >= 2` and `0 < t_min < t_max`, otherwise returns
/// [`Error::InvalidConfiguration`]. Deterministic and pure: calling this
/// twice with the same arguments produces bit-identical output.
pub fn generate(n_freq: usize, t_min: f64, t_max: f64) -> Result<FrequencyGrid, Error> {
    if n_freq < 2 {
        return Err(Error::InvalidConfiguration(format!(
            "n_freq must be at least 2, got {n_freq}"
        )));
    }
    if !(t_min.is_finite() && t_max.is_finite() && t_min > 0.0 && t_min < t_max) {
        return Err(Error::InvalidConfiguration(format!(
            "t_min ({t_min}) and t_max ({t_max}) must be finite with 0 < t_min < t_max"
        )));
    }

    let log_t_min = t_min.log10();
    let log_t_max = t_max.log10();
    let dlog_t = (log_t_max - log_t_min) / (n_freq - 1) as f64;

    let mut periods = Vec::with_capacity(n_freq);
    let mut omega = Vec::with_capacity(n_freq);
    for i in 0..n_freq {
        let log_t = log_t_min + i as f64 * dlog_t;
        let period = 10f64.powf(log_t);
        periods.push(period);
        omega.push(2.0 * std::f64::consts::PI / period);
    }

    Ok(FrequencyGrid { periods, omega })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_spans_the_requested_range() {
        let grid = generate(61, 0.001, 1000.0).unwrap();
        assert_eq!(grid.n_freq(), 61);
        assert!((grid.periods[0] - 0.001).abs() < 1e-12);
        assert!((grid.periods[60] - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn generate_is_deterministic() {
        let a = generate(10, 0.01, 100.0).unwrap();
        let b = generate(10, 0.01, 100.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn generate_rejects_too_few_frequencies() {
        assert!(generate(1, 0.001, 1000.0).is_err());
    }

    #[test]
    fn generate_rejects_inverted_range() {
        assert!(generate(10, 1000.0, 0.001).is_err());
        assert!(generate(10, -1.0, 1000.0).is_err());
    }

    #[test]
    fn omega_matches_period() {
        let grid = generate(5, 0.1, 10.0).unwrap();
        for (t, w) in grid.periods.iter().zip(grid.omega.iter()) {
            assert!((w - 2.0 * std::f64::consts::PI / t).abs() < 1e-9);
        }
    }
}
