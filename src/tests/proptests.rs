//! Property-based invariants for the individual components, independent of
//! any particular scenario.

use proptest::prelude::*;

use crate::jacobian::{JacobianCalculator, PerturbationMethod};
use crate::model::compute_layer_thicknesses;
use crate::regularization::{build_l_matrix, compute_ltl, RegularizationKind};
use crate::ForwardSolver;

proptest! {
    #[test]
    fn uniform_half_space_gives_frequency_independent_log_rho(
        log_rho in -1.0f64..4.0,
        first_thickness in 5.0f64..50.0,
        growth in 1.05f64..1.5,
    ) {
        let m = 10;
        let grid = crate::frequency::generate(9, 0.01, 500.0).unwrap();
        let (thicknesses, _) = compute_layer_thicknesses(m, first_thickness, growth);
        let model = vec![log_rho; m];
        let data = ForwardSolver.solve(&model, &grid.omega, &thicknesses);
        for k in 0..data.n_freq() {
            prop_assert!((data.rho_log10(k) - log_rho).abs() < 1e-6);
        }
    }

    #[test]
    fn deepest_layer_thickness_never_changes_the_response(
        log_rho_top in -1.0f64..3.0,
        log_rho_deep in -1.0f64..3.0,
        deep_thickness_a in 10.0f64..1000.0,
        deep_thickness_b in 10.0f64..1000.0,
    ) {
        let grid = crate::frequency::generate(7, 0.01, 100.0).unwrap();
        let model = vec![log_rho_top, log_rho_top, log_rho_deep];

        let mut thicknesses_a = vec![20.0, 40.0, deep_thickness_a];
        let mut thicknesses_b = vec![20.0, 40.0, deep_thickness_b];
        // Only the deepest entry differs; the recursion treats it as a
        // half-space and never reads its thickness.
        thicknesses_a[2] = deep_thickness_a;
        thicknesses_b[2] = deep_thickness_b;

        let data_a = ForwardSolver.solve(&model, &grid.omega, &thicknesses_a);
        let data_b = ForwardSolver.solve(&model, &grid.omega, &thicknesses_b);
        prop_assert_eq!(data_a.0, data_b.0);
    }

    #[test]
    fn jacobian_entries_are_always_finite(
        log_rho in -2.0f64..5.0,
        epsilon in 1e-7f64..1e-3,
    ) {
        let m = 6;
        let grid = crate::frequency::generate(9, 0.01, 500.0).unwrap();
        let (thicknesses, _) = compute_layer_thicknesses(m, 15.0, 1.25);
        let model = vec![log_rho; m];
        let solver = ForwardSolver;
        let d_syn = solver.solve(&model, &grid.omega, &thicknesses);
        let jacobian = JacobianCalculator::new(PerturbationMethod::Forward)
            .compute(&solver, &model, &grid.omega, &d_syn, &thicknesses, epsilon)
            .unwrap();
        for i in 0..jacobian.nrows() {
            for j in 0..jacobian.ncols() {
                prop_assert!(jacobian[(i, j)].is_finite());
            }
        }
    }

    #[test]
    fn smoothness_operator_nulls_any_uniform_or_linear_model(
        base in -3.0f64..3.0,
        slope in -1.0f64..1.0,
        num_layers in 3usize..30,
    ) {
        let l = build_l_matrix(num_layers, RegularizationKind::Smoothness);
        let model: Vec<f64> = (0..num_layers).map(|i| base + slope * i as f64).collect();
        for row in 0..l.nrows() {
            let mut acc = 0.0;
            for col in 0..l.ncols() {
                acc += l[(row, col)] * model[col];
            }
            prop_assert!(acc.abs() < 1e-9, "row {row} gave {acc}");
        }
    }

    #[test]
    fn ltl_is_symmetric_for_any_layer_count(num_layers in 3usize..25) {
        let l = build_l_matrix(num_layers, RegularizationKind::Smoothness);
        let ltl = compute_ltl(&l);
        for i in 0..num_layers {
            for j in 0..num_layers {
                prop_assert!((ltl[(i, j)] - ltl[(j, i)]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn frequency_generation_is_idempotent(
        n_freq in 2usize..200,
        t_min in 1e-4f64..1.0,
        t_max_offset in 1.0f64..1000.0,
    ) {
        let t_max = t_min + t_max_offset;
        let a = crate::frequency::generate(n_freq, t_min, t_max).unwrap();
        let b = crate::frequency::generate(n_freq, t_min, t_max).unwrap();
        prop_assert_eq!(a.periods, b.periods);
        prop_assert_eq!(a.omega, b.omega);
    }
}
