use crate::ReactorsSS::SimpleReactorSS::ReactorError;
use RustedSciThe::symbolic::symbolic_engine::Expr;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Negative concentrations larger than this (in absolute value) are a domain
/// failure; smaller ones are numerical noise and are clipped to zero.
const NEGATIVE_CLIP: f64 = 1e-12;

/// Raises a concentration to a reaction order with a domain guard: a genuinely
/// negative base under a (possibly fractional) power is rejected instead of
/// silently producing a NaN.
fn conc_power(c: f64, order: f64, species: &str) -> Result<f64, ReactorError> {
    let c = if c < 0.0 {
        if c > -NEGATIVE_CLIP {
            0.0
        } else {
            return Err(ReactorError::DomainError(format!(
                "negative concentration {:.6e} of '{}' in rate-law evaluation",
                c, species
            )));
        }
    } else {
        c
    };
    Ok(c.powf(order))
}

/// Kinetic rate law of a single reaction.
///
/// `Irreversible` is plain mass-action kinetics r = k * prod(Ci^orders).
/// `Reversible` couples the forward constant with an equilibrium constant
/// K_eq = k1/k2, so the net rate is
/// r = k1 * (prod(C_reag^orders) - prod(C_prod^orders)/K_eq).
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RateLaw {
    Irreversible { k: f64 },
    Reversible { k1: f64, K_eq: f64 },
}

impl RateLaw {
    pub fn validate(&self) -> Result<(), ReactorError> {
        match self {
            RateLaw::Irreversible { k } => {
                if *k <= 0.0 || !k.is_finite() {
                    return Err(ReactorError::InvalidConfiguration(format!(
                        "rate constant k must be positive and finite, got {}",
                        k
                    )));
                }
            }
            RateLaw::Reversible { k1, K_eq } => {
                if *k1 <= 0.0 || !k1.is_finite() {
                    return Err(ReactorError::InvalidConfiguration(format!(
                        "forward rate constant k1 must be positive and finite, got {}",
                        k1
                    )));
                }
                if *K_eq <= 0.0 || !K_eq.is_finite() {
                    return Err(ReactorError::InvalidConfiguration(format!(
                        "equilibrium constant K_eq must be positive and finite, got {}",
                        K_eq
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn is_reversible(&self) -> bool {
        matches!(self, RateLaw::Reversible { .. })
    }

    pub fn forward_constant(&self) -> f64 {
        match self {
            RateLaw::Irreversible { k } => *k,
            RateLaw::Reversible { k1, .. } => *k1,
        }
    }

    /// k2 = k1/K_eq for a reversible law, None otherwise.
    pub fn reverse_constant(&self) -> Option<f64> {
        match self {
            RateLaw::Irreversible { .. } => None,
            RateLaw::Reversible { k1, K_eq } => Some(k1 / K_eq),
        }
    }

    /// Symbolic net-rate expression. `conc` maps each substance name to the
    /// expression standing for its local concentration (a plain variable for a
    /// CSTR, flow divided by volumetric rate for a PFR).
    pub fn rate_expr(
        &self,
        forward_orders: &[(String, f64)],
        reverse_orders: &[(String, f64)],
        conc: &HashMap<String, Expr>,
    ) -> Result<Expr, ReactorError> {
        let forward = Self::side_product_expr(forward_orders, conc)?;
        let expr = match self {
            RateLaw::Irreversible { k } => Expr::Const(*k) * forward,
            RateLaw::Reversible { k1, K_eq } => {
                let reverse = Self::side_product_expr(reverse_orders, conc)?;
                Expr::Const(*k1) * (forward - reverse / Expr::Const(*K_eq))
            }
        };
        Ok(expr.simplify())
    }

    /// Numeric net rate at the given composition. Pure function of its inputs.
    pub fn rate_value(
        &self,
        forward_orders: &[(String, f64)],
        reverse_orders: &[(String, f64)],
        conc: &HashMap<String, f64>,
    ) -> Result<f64, ReactorError> {
        let forward = Self::side_product_value(forward_orders, conc)?;
        match self {
            RateLaw::Irreversible { k } => Ok(k * forward),
            RateLaw::Reversible { k1, K_eq } => {
                let reverse = Self::side_product_value(reverse_orders, conc)?;
                Ok(k1 * (forward - reverse / K_eq))
            }
        }
    }

    fn side_product_expr(
        orders: &[(String, f64)],
        conc: &HashMap<String, Expr>,
    ) -> Result<Expr, ReactorError> {
        let mut product = Expr::Const(1.0);
        for (species, order) in orders {
            if *order == 0.0 {
                continue;
            }
            let ci = conc.get(species).ok_or_else(|| {
                ReactorError::MissingData(format!(
                    "no concentration expression for substance '{}'",
                    species
                ))
            })?;
            let factor = if *order == 1.0 {
                ci.clone()
            } else {
                ci.clone().pow(Expr::Const(*order))
            };
            product = product * factor;
        }
        Ok(product)
    }

    fn side_product_value(
        orders: &[(String, f64)],
        conc: &HashMap<String, f64>,
    ) -> Result<f64, ReactorError> {
        let mut product = 1.0;
        for (species, order) in orders {
            if *order == 0.0 {
                continue;
            }
            let ci = conc.get(species).ok_or_else(|| {
                ReactorError::MissingData(format!(
                    "no concentration given for substance '{}'",
                    species
                ))
            })?;
            product *= conc_power(*ci, *order, species)?;
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn orders(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(s, o)| (s.to_string(), *o)).collect()
    }

    #[test]
    fn test_irreversible_rate_value() {
        let law = RateLaw::Irreversible { k: 0.5 };
        let fwd = orders(&[("A", 1.0), ("B", 2.0)]);
        let conc = HashMap::from([("A".to_string(), 2.0), ("B".to_string(), 3.0)]);
        let r = law.rate_value(&fwd, &[], &conc).unwrap();
        assert_relative_eq!(r, 0.5 * 2.0 * 9.0, max_relative = 1e-12);
    }

    #[test]
    fn test_reversible_rate_vanishes_at_equilibrium() {
        // K_eq = ([C][D])/([A][B]) at equilibrium, so the net rate is zero there
        let law = RateLaw::Reversible { k1: 0.02, K_eq: 4.0 };
        let fwd = orders(&[("A", 1.0), ("B", 1.0)]);
        let rev = orders(&[("C", 1.0), ("D", 1.0)]);
        let conc = HashMap::from([
            ("A".to_string(), 1.0),
            ("B".to_string(), 1.0),
            ("C".to_string(), 2.0),
            ("D".to_string(), 2.0),
        ]);
        let r = law.rate_value(&fwd, &rev, &conc).unwrap();
        assert_relative_eq!(r, 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_reverse_constant() {
        let law = RateLaw::Reversible { k1: 0.02, K_eq: 1.44395809814 };
        assert_relative_eq!(
            law.reverse_constant().unwrap(),
            0.02 / 1.44395809814,
            max_relative = 1e-12
        );
        assert!(RateLaw::Irreversible { k: 1.0 }.reverse_constant().is_none());
    }

    #[test]
    fn test_fractional_order_domain_guard() {
        let law = RateLaw::Irreversible { k: 55.2 };
        let fwd = orders(&[("M", 1.0), ("H2", 0.5)]);
        let conc = HashMap::from([("M".to_string(), 0.01), ("H2".to_string(), -0.02)]);
        match law.rate_value(&fwd, &[], &conc) {
            Err(ReactorError::DomainError(msg)) => assert!(msg.contains("H2")),
            other => panic!("expected DomainError, got {:?}", other),
        }
        // noise-level negatives are clipped, not rejected
        let conc = HashMap::from([("M".to_string(), 0.01), ("H2".to_string(), -1e-14)]);
        assert_relative_eq!(law.rate_value(&fwd, &[], &conc).unwrap(), 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(RateLaw::Irreversible { k: 0.02 }.validate().is_ok());
        assert!(RateLaw::Irreversible { k: -1.0 }.validate().is_err());
        assert!(RateLaw::Reversible { k1: 0.02, K_eq: 0.0 }.validate().is_err());
    }

    #[test]
    fn test_rate_expr_matches_rate_value() {
        let law = RateLaw::Reversible { k1: 0.02, K_eq: 1.44395809814 };
        let fwd = orders(&[("A", 1.0), ("B", 1.0)]);
        let rev = orders(&[("C", 1.0), ("D", 1.0)]);
        let conc_exprs: HashMap<String, Expr> = ["A", "B", "C", "D"]
            .iter()
            .map(|s| (s.to_string(), Expr::Var(s.to_string())))
            .collect();
        let expr = law.rate_expr(&fwd, &rev, &conc_exprs).unwrap();
        let f = expr.lambdify_owned(vec!["A", "B", "C", "D"]);
        let numeric = law
            .rate_value(
                &fwd,
                &rev,
                &HashMap::from([
                    ("A".to_string(), 0.0327),
                    ("B".to_string(), 0.0327),
                    ("C".to_string(), 0.0173),
                    ("D".to_string(), 0.0173),
                ]),
            )
            .unwrap();
        assert_relative_eq!(
            f(vec![0.0327, 0.0327, 0.0173, 0.0173]),
            numeric,
            max_relative = 1e-10
        );
    }
}
