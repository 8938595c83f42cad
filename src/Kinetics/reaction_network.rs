use crate::Kinetics::rate_laws::RateLaw;
use crate::Kinetics::stoichiometry_analyzer::StoichAnalyzer;
use crate::ReactorsSS::SimpleReactorSS::ReactorError;
use RustedSciThe::symbolic::symbolic_engine::Expr;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One reaction of the network: its equation string, its rate law and optional
/// empirical reaction-order overrides for the forward kinetic function (used when
/// the observed orders differ from the stoichiometric coefficients, e.g. the
/// half-order hydrogen dependence of hydrodealkylation kinetics).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub equation: String,
    pub rate_law: RateLaw,
    pub order_overrides: Option<HashMap<String, f64>>,
}

impl Reaction {
    pub fn new(equation: &str, rate_law: RateLaw) -> Self {
        Self {
            equation: equation.to_string(),
            rate_law,
            order_overrides: None,
        }
    }

    pub fn with_orders(mut self, overrides: HashMap<String, f64>) -> Self {
        self.order_overrides = Some(overrides);
        self
    }
}

/// Aggregates the reactions of a problem with their parsed stoichiometry.
/// Net species rates R_i = SUM_j(nu_ij * r_j) are derived mechanically from the
/// stoichiometric matrix, so adding a reaction or substance requires no
/// hand-derived sign bookkeeping. Constructed once per task, then read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionNetwork {
    pub reactions: Vec<Reaction>,
    pub stecheodata: StoichAnalyzer,
}

impl ReactionNetwork {
    pub fn from_reactions(reactions: Vec<Reaction>) -> Result<Self, ReactorError> {
        if reactions.is_empty() {
            return Err(ReactorError::MissingData(
                "reaction network needs at least one reaction".to_string(),
            ));
        }
        for reaction in &reactions {
            reaction.rate_law.validate()?;
        }

        let mut analyzer = StoichAnalyzer::new();
        analyzer.reactions = reactions.iter().map(|r| r.equation.clone()).collect();
        analyzer.search_substances()?;
        analyzer.analyse_reactions()?;

        // the equation marker and the rate law must agree on reversibility
        for (j, reaction) in reactions.iter().enumerate() {
            if analyzer.reversibility[j] != reaction.rate_law.is_reversible() {
                return Err(ReactorError::InvalidConfiguration(format!(
                    "reaction '{}' is written {} but its rate law is {}",
                    reaction.equation,
                    if analyzer.reversibility[j] { "reversible ('<=>')" } else { "irreversible" },
                    if reaction.rate_law.is_reversible() { "reversible" } else { "irreversible" },
                )));
            }
        }

        // empirical order overrides replace the stoichiometric exponents
        // in the forward kinetic function
        for (j, reaction) in reactions.iter().enumerate() {
            if let Some(overrides) = &reaction.order_overrides {
                for (species, order) in overrides {
                    let i = analyzer.substance_index(species).map_err(|_| {
                        ReactorError::InvalidConfiguration(format!(
                            "order override for '{}' in '{}': no such substance in the network",
                            species, reaction.equation
                        ))
                    })?;
                    analyzer.reagent_orders[j][i] = *order;
                }
            }
        }

        Ok(Self {
            reactions,
            stecheodata: analyzer,
        })
    }

    pub fn substances(&self) -> &[String] {
        &self.stecheodata.substances
    }

    pub fn n_substances(&self) -> usize {
        self.stecheodata.substances.len()
    }

    pub fn n_reactions(&self) -> usize {
        self.reactions.len()
    }

    /// (substance, exponent) pairs of the forward kinetic function of reaction j.
    pub fn forward_orders(&self, j: usize) -> Vec<(String, f64)> {
        self.order_pairs(&self.stecheodata.reagent_orders[j])
    }

    /// (substance, exponent) pairs of the reverse kinetic function of reaction j.
    pub fn reverse_orders(&self, j: usize) -> Vec<(String, f64)> {
        self.order_pairs(&self.stecheodata.product_orders[j])
    }

    fn order_pairs(&self, row: &[f64]) -> Vec<(String, f64)> {
        self.stecheodata
            .substances
            .iter()
            .zip(row.iter())
            .filter(|(_, order)| **order != 0.0)
            .map(|(s, order)| (s.clone(), *order))
            .collect()
    }

    /// Concentration expressions where each substance stands for itself as a
    /// plain symbolic variable (the CSTR case).
    pub fn plain_conc_exprs(&self) -> HashMap<String, Expr> {
        self.stecheodata
            .substances
            .iter()
            .map(|s| (s.clone(), Expr::Var(s.clone())))
            .collect()
    }

    /// Symbolic rate expression r_j for every reaction.
    pub fn reaction_rate_exprs(
        &self,
        conc: &HashMap<String, Expr>,
    ) -> Result<Vec<Expr>, ReactorError> {
        let mut rates = Vec::with_capacity(self.reactions.len());
        for (j, reaction) in self.reactions.iter().enumerate() {
            let rate = reaction.rate_law.rate_expr(
                &self.forward_orders(j),
                &self.reverse_orders(j),
                conc,
            )?;
            rates.push(rate);
        }
        Ok(rates)
    }

    /// Symbolic net production rate R_i = SUM_j(nu_ij * r_j) for every substance.
    pub fn net_rate_exprs(
        &self,
        conc: &HashMap<String, Expr>,
    ) -> Result<HashMap<String, Expr>, ReactorError> {
        let rates = self.reaction_rate_exprs(conc)?;
        let mut net: HashMap<String, Expr> = HashMap::new();
        for (i, substance) in self.stecheodata.substances.iter().enumerate() {
            let mut ri = Expr::Const(0.0);
            for (j, rate) in rates.iter().enumerate() {
                let nu_ij = self.stecheodata.stoich_matrix[j][i];
                if nu_ij == 0.0 {
                    continue;
                }
                ri = ri + Expr::Const(nu_ij) * rate.clone();
            }
            net.insert(substance.clone(), ri.simplify());
        }
        Ok(net)
    }

    /// Numeric rate r_j of every reaction at the given composition.
    pub fn reaction_rates(&self, conc: &HashMap<String, f64>) -> Result<Vec<f64>, ReactorError> {
        let mut rates = Vec::with_capacity(self.reactions.len());
        for (j, reaction) in self.reactions.iter().enumerate() {
            let rate = reaction.rate_law.rate_value(
                &self.forward_orders(j),
                &self.reverse_orders(j),
                conc,
            )?;
            rates.push(rate);
        }
        Ok(rates)
    }

    /// Numeric net production rate per substance. Pure: identical inputs give
    /// identical outputs, no internal state is touched.
    pub fn net_rates(
        &self,
        conc: &HashMap<String, f64>,
    ) -> Result<HashMap<String, f64>, ReactorError> {
        let rates = self.reaction_rates(conc)?;
        let mut net: HashMap<String, f64> = HashMap::new();
        for (i, substance) in self.stecheodata.substances.iter().enumerate() {
            let mut ri = 0.0;
            for (j, rate) in rates.iter().enumerate() {
                ri += self.stecheodata.stoich_matrix[j][i] * rate;
            }
            net.insert(substance.clone(), ri);
        }
        Ok(net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mesitylene_network() -> ReactionNetwork {
        // M + H2 => X + Me,  X + H2 => T + Me, both half order in hydrogen
        ReactionNetwork::from_reactions(vec![
            Reaction::new("M+H2=>X+Me", RateLaw::Irreversible { k: 55.20 })
                .with_orders(HashMap::from([("H2".to_string(), 0.5)])),
            Reaction::new("X+H2=>T+Me", RateLaw::Irreversible { k: 30.20 })
                .with_orders(HashMap::from([("H2".to_string(), 0.5)])),
        ])
        .unwrap()
    }

    #[test]
    fn test_substances_and_orders() {
        let network = mesitylene_network();
        assert_eq!(network.substances(), ["M", "H2", "X", "Me", "T"]);
        assert_eq!(
            network.forward_orders(0),
            vec![("M".to_string(), 1.0), ("H2".to_string(), 0.5)]
        );
        assert_eq!(
            network.forward_orders(1),
            vec![("H2".to_string(), 0.5), ("X".to_string(), 1.0)]
        );
    }

    #[test]
    fn test_net_rates_signs() {
        let network = mesitylene_network();
        let conc = HashMap::from([
            ("M".to_string(), 0.00294),
            ("H2".to_string(), 0.00905),
            ("X".to_string(), 0.00317),
            ("Me".to_string(), 0.01226),
            ("T".to_string(), 0.00455),
        ]);
        let rates = network.reaction_rates(&conc).unwrap();
        let r1 = 55.20 * 0.00294 * 0.00905f64.sqrt();
        let r2 = 30.20 * 0.00317 * 0.00905f64.sqrt();
        assert_relative_eq!(rates[0], r1, max_relative = 1e-12);
        assert_relative_eq!(rates[1], r2, max_relative = 1e-12);

        let net = network.net_rates(&conc).unwrap();
        assert_relative_eq!(net["M"], -r1, max_relative = 1e-12);
        assert_relative_eq!(net["X"], r1 - r2, max_relative = 1e-12);
        assert_relative_eq!(net["Me"], r1 + r2, max_relative = 1e-12);
        assert_relative_eq!(net["T"], r2, max_relative = 1e-12);
        assert_relative_eq!(net["H2"], -r1 - r2, max_relative = 1e-12);
        // both reactions conserve moles, so the net rates must sum to zero
        let total: f64 = net.values().sum();
        assert_relative_eq!(total, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_net_rates_idempotent() {
        let network = mesitylene_network();
        let conc = HashMap::from([
            ("M".to_string(), 0.005),
            ("H2".to_string(), 0.01),
            ("X".to_string(), 0.001),
            ("Me".to_string(), 0.002),
            ("T".to_string(), 0.0005),
        ]);
        let first = network.net_rates(&conc).unwrap();
        let second = network.net_rates(&conc).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reversibility_mismatch_is_rejected() {
        let result = ReactionNetwork::from_reactions(vec![Reaction::new(
            "A+B=>C+D",
            RateLaw::Reversible { k1: 0.02, K_eq: 1.44 },
        )]);
        assert!(matches!(
            result,
            Err(ReactorError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_unknown_override_species_is_rejected() {
        let result = ReactionNetwork::from_reactions(vec![Reaction::new(
            "A=>B",
            RateLaw::Irreversible { k: 1.0 },
        )
        .with_orders(HashMap::from([("Z".to_string(), 0.5)]))]);
        assert!(matches!(
            result,
            Err(ReactorError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_empty_network_is_rejected() {
        assert!(matches!(
            ReactionNetwork::from_reactions(vec![]),
            Err(ReactorError::MissingData(_))
        ));
    }
}
