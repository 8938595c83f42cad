pub fn reactor_examples(task: usize) {
    //

    match task {
        0 => {
            // STOICHIOMETRIC ANALYSIS
            use crate::Kinetics::stoichiometry_analyzer::StoichAnalyzer;
            let mut analyzer = StoichAnalyzer::new();
            let reactions_: Vec<&str> = vec!["M+H2=>X+Me", "X+H2=>T+Me"];
            analyzer.reactions = reactions_.iter().map(|s| s.to_string()).collect();
            analyzer.search_substances().unwrap();
            analyzer.analyse_reactions().unwrap();

            let result = [
                [-1.0, -1.0, 1.0, 1.0, 0.0],
                [0.0, -1.0, -1.0, 1.0, 1.0],
            ];
            let result: Vec<Vec<f64>> = result.iter().map(|row| row.to_vec()).collect();
            assert_eq!(analyzer.stoich_matrix, result);
            println!("substances: {:?}", analyzer.substances);
            println!("stoich_matrix {:?}", analyzer.stoich_matrix);
        }
        1 => {
            // REVERSIBLE CSTR: A + B <=> C + D in the liquid phase.
            // With tau = 1000 s the outlet sits close to equilibrium:
            // Ca = Cb = 0.0327, Cc = Cd = 0.0173
            use crate::Kinetics::rate_laws::RateLaw;
            use crate::Kinetics::reaction_network::{Reaction, ReactionNetwork};
            use crate::ReactorsSS::SimpleReactorSS::CstrTask;
            use std::collections::HashMap;

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
            let solution = task.solve().unwrap().clone();
            task.pretty_print_results();
            assert!((solution["A"] - 0.0327).abs() < 1e-4);
            assert!((solution["C"] - 0.0173).abs() < 1e-4);
        }
        2 => {
            // MESITYLENE HYDRODEALKYLATION IN A CSTR.
            // M + H2 -> X + Me, then X + H2 -> T + Me, half order in
            // hydrogen. Feed: 1:2 mesitylene/hydrogen at 35 atm, 1500 R,
            // tau = 0.5 h. Xylene production peaks near this residence time.
            use crate::Kinetics::rate_laws::RateLaw;
            use crate::Kinetics::reaction_network::{Reaction, ReactionNetwork};
            use crate::ReactorsSS::SimpleReactorSS::CstrTask;
            use std::collections::HashMap;

            let ct0 = 35.0 / (0.73 * 1500.0);
            let network = ReactionNetwork::from_reactions(vec![
                Reaction::new("M+H2=>X+Me", RateLaw::Irreversible { k: 55.20 })
                    .with_orders(HashMap::from([("H2".to_string(), 0.5)])),
                Reaction::new("X+H2=>T+Me", RateLaw::Irreversible { k: 30.20 })
                    .with_orders(HashMap::from([("H2".to_string(), 0.5)])),
            ])
            .unwrap();
            let mut task = CstrTask::new();
            task.set_problem_name("mesitylene hydrodealkylation, CSTR");
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
            let solution = task.solve().unwrap().clone();
            task.pretty_print_results();
            assert!((solution["X"] - 0.00317).abs() < 1e-4);
            let ct: f64 = solution.values().sum();
            println!("total outlet concentration {:.6} (inlet {:.6})", ct, ct0);
        }
        3 => {
            // MESITYLENE HYDRODEALKYLATION IN A PFR, same kinetics and feed.
            use crate::Kinetics::rate_laws::RateLaw;
            use crate::Kinetics::reaction_network::{Reaction, ReactionNetwork};
            use crate::ReactorsIVP::SimpleReactorPFR::{FlowMode, PfrTask};
            use RustedSciThe::numerical::ODE_api2::SolverType;
            use std::collections::HashMap;

            let ct0 = 35.0 / (0.73 * 1500.0);
            let v0 = 476.0;
            let network = ReactionNetwork::from_reactions(vec![
                Reaction::new("M+H2=>X+Me", RateLaw::Irreversible { k: 55.20 })
                    .with_orders(HashMap::from([("H2".to_string(), 0.5)])),
                Reaction::new("X+H2=>T+Me", RateLaw::Irreversible { k: 30.20 })
                    .with_orders(HashMap::from([("H2".to_string(), 0.5)])),
            ])
            .unwrap();
            let mut task = PfrTask::new(SolverType::BDF);
            task.set_problem_name("mesitylene hydrodealkylation, PFR");
            task.set_network(network);
            task.set_operating_conditions(v0, 0.0, 238.0);
            task.set_flow_mode(FlowMode::GasPhase);
            task.set_inlet_flows(HashMap::from([
                ("M".to_string(), v0 * ct0 / 3.0),
                ("H2".to_string(), v0 * 2.0 * ct0 / 3.0),
                ("X".to_string(), 0.0),
                ("Me".to_string(), 0.0),
                ("T".to_string(), 0.0),
            ]));
            task.solve().unwrap();
            task.pretty_print_results().unwrap();
            let quality = task.quality.as_ref().unwrap();
            println!(
                "profile: {} points, total flow drift {:?}",
                quality.n_points, quality.total_flow_drift
            );
        }
        4 => {
            // TASK PARSED FROM TEXT
            use crate::ReactorsSS::SimpleReactorSS::CstrTask;
            let content = "DESCRIPTION\nreversible A + B to C + D\n\n\
                REACTIONS\nA+B<=>C+D k1=0.02 Keq=1.44395809814\n\n\
                CONDITIONS\nv0 0.01\nV 10\nC0 A 0.05\nC0 B 0.05\nC0 C 0\nC0 D 0\n";
            let mut task = CstrTask::new();
            task.parse_from_str(content).unwrap();
            task.solve().unwrap();
            task.pretty_print_results();
        }
        _ => {
            println!("unknown task number {}", task);
        }
    }
}
