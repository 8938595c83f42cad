/// The module takes as input a vector of reaction equations specified as a vector of String
/// and produces the following data:
/// 1) a stoichiometric matrix specified as a vector of vectors
/// 2) a vector of substances
/// 3) a vector of vectors of concentration exponents of reactants in each reaction
/// 4) the same for products
/// As a rule, the degrees of concentration in the kinetic function coincide with the
/// stoichiometric coefficients of the substances in the reaction; however, for empirical
/// reactions they may differ, so the exponent matrices are stored separately and may be
/// overridden per reaction.
///
/// # Examples
/// ```
/// use ReactorLab::Kinetics::stoichiometry_analyzer::StoichAnalyzer;
/// let mut analyzer = StoichAnalyzer::new();
/// let reactions: Vec<&str> = vec!["A+B<=>C+D", "2*H2+O2=>2*H2O"];
/// analyzer.reactions = reactions.iter().map(|s| s.to_string()).collect();
/// analyzer.search_substances().unwrap();
/// analyzer.analyse_reactions().unwrap();
/// println!("substances: {:?}", analyzer.substances);
/// ```
pub mod stoichiometry_analyzer;

/// Rate-law structures with dual numeric/symbolic evaluation: irreversible mass-action
/// kinetics and reversible kinetics through an equilibrium constant,
/// net rate = k1*(prod of reactant concentrations^orders - prod of product concentrations^orders / K_eq)
pub mod rate_laws;

/// The struct ReactionNetwork collects all the information about the chosen reactions
/// which is needed for further reactor calculations: substances, stoichiometric matrices
/// and rate laws. Net species rates are derived mechanically from the stoichiometric
/// coefficient table, so adding a reaction or a substance requires no hand re-derivation.
pub mod reaction_network;
