#[cfg(test)]
mod tests {
    use crate::Kinetics::rate_laws::RateLaw;
    use crate::Kinetics::reaction_network::{Reaction, ReactionNetwork};
    use crate::ReactorsSS::SimpleReactorSS::{CstrTask, ReactorError};
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    /// Reversible liquid-phase A + B <=> C + D at 1000 K.
    fn reversible_task() -> CstrTask {
        let network = ReactionNetwork::from_reactions(vec![Reaction::new(
            "A+B<=>C+D",
            RateLaw::Reversible {
                k1: 0.02,
                K_eq: 1.44395809814,
            },
        )])
        .unwrap();
        let mut task = CstrTask::new();
        task.set_problem_name("reversible A+B<=>C+D");
        task.set_network(network);
        task.set_operating_conditions(0.01, 10.0);
        task.set_inlet_concentrations(HashMap::from([
            ("A".to_string(), 0.05),
            ("B".to_string(), 0.05),
            ("C".to_string(), 0.0),
            ("D".to_string(), 0.0),
        ]));
        task
    }

    /// Gas-phase hydrodealkylation of mesitylene in series,
    /// M + H2 -> X + Me then X + H2 -> T + Me, with half-order hydrogen.
    /// Feed is a 1:2 mesitylene/hydrogen mixture at 35 atm and 1500 R,
    /// total concentration 0.031963 lbmol/ft3, residence time 0.5 h.
    fn mesitylene_task() -> CstrTask {
        let ct0 = 35.0 / (0.73 * 1500.0);
        let network = ReactionNetwork::from_reactions(vec![
            Reaction::new("M+H2=>X+Me", RateLaw::Irreversible { k: 55.20 })
                .with_orders(HashMap::from([("H2".to_string(), 0.5)])),
            Reaction::new("X+H2=>T+Me", RateLaw::Irreversible { k: 30.20 })
                .with_orders(HashMap::from([("H2".to_string(), 0.5)])),
        ])
        .unwrap();
        let mut task = CstrTask::new();
        task.set_problem_name("mesitylene hydrodealkylation");
        task.set_network(network);
        task.set_operating_conditions(476.0, 238.0);
        task.set_inlet_concentrations(HashMap::from([
            ("M".to_string(), ct0 / 3.0),
            ("H2".to_string(), 2.0 * ct0 / 3.0),
            ("X".to_string(), 0.0),
            ("Me".to_string(), 0.0),
            ("T".to_string(), 0.0),
        ]));
        task.set_initial_guess(HashMap::from([
            ("M".to_string(), 0.003),
            ("H2".to_string(), 0.009),
            ("X".to_string(), 0.003),
            ("Me".to_string(), 0.012),
            ("T".to_string(), 0.005),
        ]));
        task
    }

    #[test]
    fn test_reversible_cstr_literature_point() {
        let mut task = reversible_task();
        task.set_solver_settings(1e-10, 500, None, None);
        let solution = task.solve().unwrap().clone();
        assert_relative_eq!(solution["A"], 0.0327, epsilon = 1e-4);
        assert_relative_eq!(solution["B"], 0.0327, epsilon = 1e-4);
        assert_relative_eq!(solution["C"], 0.0173, epsilon = 1e-4);
        assert_relative_eq!(solution["D"], 0.0173, epsilon = 1e-4);
        // A + C is conserved by the stoichiometry
        assert_relative_eq!(solution["A"] + solution["C"], 0.05, epsilon = 1e-8);
    }

    #[test]
    fn test_reversible_cstr_residuals_vanish_at_solution() {
        let mut task = reversible_task();
        task.set_solver_settings(1e-10, 500, None, None);
        let solution = task.solve().unwrap().clone();
        let residuals = task.ss_residuals(&solution).unwrap();
        for (substance, r) in &residuals {
            assert!(
                r.abs() < 1e-8,
                "residual of {} is {:.3e} at the solution",
                substance,
                r
            );
        }
    }

    #[test]
    fn test_mesitylene_cstr_literature_point() {
        let mut task = mesitylene_task();
        task.set_solver_settings(1e-10, 500, None, None);
        let solution = task.solve().unwrap().clone();
        assert_relative_eq!(solution["M"], 0.00294, epsilon = 5e-5);
        assert_relative_eq!(solution["H2"], 0.00905, epsilon = 5e-5);
        assert_relative_eq!(solution["X"], 0.00317, epsilon = 5e-5);
        assert_relative_eq!(solution["Me"], 0.01226, epsilon = 5e-5);
        assert_relative_eq!(solution["T"], 0.00455, epsilon = 5e-5);
    }

    #[test]
    fn test_mesitylene_cstr_conserves_total_moles() {
        // both reactions take 2 moles to 2 moles, so the mixture
        // concentration at fixed T and P does not change
        let mut task = mesitylene_task();
        task.set_solver_settings(1e-10, 500, None, None);
        let solution = task.solve().unwrap();
        let ct0 = 35.0 / (0.73 * 1500.0);
        let ct: f64 = solution.values().sum();
        assert_relative_eq!(ct, ct0, epsilon = 1e-6);
    }

    #[test]
    fn test_equilibrium_limit_at_long_residence_time() {
        let mut task = reversible_task();
        // tau = 1e8: the outlet must sit on the equilibrium manifold
        task.set_operating_conditions(0.01, 1e6);
        task.set_solver_settings(1e-12, 500, None, None);
        let solution = task.solve().unwrap();
        let keq = 1.44395809814;
        let lhs = solution["C"] * solution["D"];
        let rhs = keq * solution["A"] * solution["B"];
        assert_relative_eq!(lhs, rhs, max_relative = 1e-4);
    }

    #[test]
    fn test_ss_residuals_are_idempotent() {
        let task = reversible_task();
        let conc = HashMap::from([
            ("A".to_string(), 0.04),
            ("B".to_string(), 0.04),
            ("C".to_string(), 0.01),
            ("D".to_string(), 0.01),
        ]);
        let first = task.ss_residuals(&conc).unwrap();
        let second = task.ss_residuals(&conc).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_residual_matches_balance_by_hand() {
        let task = reversible_task();
        let conc = HashMap::from([
            ("A".to_string(), 0.0327),
            ("B".to_string(), 0.0327),
            ("C".to_string(), 0.0173),
            ("D".to_string(), 0.0173),
        ]);
        let residuals = task.ss_residuals(&conc).unwrap();
        let r = 0.02 * (0.0327_f64 * 0.0327 - 0.0173 * 0.0173 / 1.44395809814);
        assert_relative_eq!(residuals["A"], 0.01 * (0.05 - 0.0327) - 10.0 * r, epsilon = 1e-12);
        assert_relative_eq!(residuals["C"], 0.01 * (0.0 - 0.0173) + 10.0 * r, epsilon = 1e-12);
    }

    #[test]
    fn test_check_task_rejects_missing_network() {
        let mut task = CstrTask::new();
        task.set_operating_conditions(0.01, 10.0);
        match task.check_task() {
            Err(ReactorError::MissingData(msg)) => assert!(msg.contains("network")),
            other => panic!("expected MissingData, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_check_task_rejects_nonpositive_flow() {
        let mut task = reversible_task();
        task.set_operating_conditions(0.0, 10.0);
        assert!(matches!(
            task.check_task(),
            Err(ReactorError::MissingData(_))
        ));
    }

    #[test]
    fn test_check_task_rejects_all_zero_inlet() {
        let mut task = reversible_task();
        task.set_inlet_concentrations(HashMap::from([
            ("A".to_string(), 0.0),
            ("B".to_string(), 0.0),
            ("C".to_string(), 0.0),
            ("D".to_string(), 0.0),
        ]));
        assert!(matches!(
            task.check_task(),
            Err(ReactorError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_incomplete_guess_set_after_equations_is_reported() {
        // the guess arrives after the equations were built, so solve() must
        // re-validate instead of indexing into a short map
        let mut task = reversible_task();
        task.create_SS_equations().unwrap();
        task.set_initial_guess(HashMap::from([("A".to_string(), 0.04)]));
        match task.solve() {
            Err(ReactorError::MissingData(msg)) => assert!(msg.contains("initial guess")),
            other => panic!("expected MissingData, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_check_task_rejects_incomplete_inlet() {
        let mut task = reversible_task();
        let mut inlet = task.inlet_concentrations.clone();
        inlet.remove("D");
        task.set_inlet_concentrations(inlet);
        match task.check_task() {
            Err(ReactorError::MissingData(msg)) => assert!(msg.contains("D")),
            other => panic!("expected MissingData, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_save_solution_round_trip() {
        let mut task = reversible_task();
        task.set_solver_settings(1e-10, 500, None, None);
        task.solve().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solution.json");
        task.save_solution(path.to_str().unwrap()).unwrap();
        let loaded: HashMap<String, f64> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, task.map_of_solutions);
    }

    #[test]
    fn test_solution_to_json_requires_solve() {
        let task = reversible_task();
        assert!(matches!(
            task.solution_to_json(),
            Err(ReactorError::MissingData(_))
        ));
    }

    #[test]
    fn test_residence_time() {
        let task = mesitylene_task();
        assert_relative_eq!(task.residence_time(), 0.5);
    }
}
