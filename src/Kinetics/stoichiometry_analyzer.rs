use crate::ReactorsSS::SimpleReactorSS::ReactorError;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Markers separating the reagent and product sides of a reaction equation.
/// "<=>" marks a reversible reaction, the rest are irreversible synonyms.
const REVERSIBLE_MARKER: &str = "<=>";
const IRREVERSIBLE_MARKERS: [&str; 3] = ["=>", "->", "="];

/// A single parsed side term: stoichiometric coefficient and substance name.
/// "2*H2" and "2H2O" are both accepted, a bare name means coefficient 1.
fn term_regex() -> Regex {
    Regex::new(r"^\s*(\d+(?:\.\d+)?)?\s*\*?\s*([A-Za-z][A-Za-z0-9_()]*)\s*$")
        .expect("term regex is valid")
}

/// Splits a reaction equation into reagent side, product side and reversibility flag.
fn split_equation(equation: &str) -> Result<(String, String, bool), ReactorError> {
    if let Some((left, right)) = equation.split_once(REVERSIBLE_MARKER) {
        return Ok((left.to_string(), right.to_string(), true));
    }
    for marker in IRREVERSIBLE_MARKERS {
        if let Some((left, right)) = equation.split_once(marker) {
            return Ok((left.to_string(), right.to_string(), false));
        }
    }
    Err(ReactorError::ParseError(format!(
        "no reaction separator ('<=>', '=>', '->', '=') found in '{}'",
        equation
    )))
}

/// Parses one side of an equation into (substance, coefficient) pairs.
/// Repeated substances are merged: "A + A" gives coefficient 2 for A.
fn parse_side(side: &str, equation: &str) -> Result<Vec<(String, f64)>, ReactorError> {
    let re = term_regex();
    let mut terms: Vec<(String, f64)> = Vec::new();
    for raw_term in side.split('+') {
        let caps = re.captures(raw_term.trim()).ok_or_else(|| {
            ReactorError::ParseError(format!(
                "cannot parse term '{}' in reaction '{}'",
                raw_term.trim(),
                equation
            ))
        })?;
        let coeff = match caps.get(1) {
            Some(c) => c.as_str().parse::<f64>().map_err(|_| {
                ReactorError::ParseError(format!(
                    "bad stoichiometric coefficient in term '{}' of '{}'",
                    raw_term.trim(),
                    equation
                ))
            })?,
            None => 1.0,
        };
        let name = caps[2].to_string();
        match terms.iter_mut().find(|(s, _)| *s == name) {
            Some((_, nu)) => *nu += coeff,
            None => terms.push((name, coeff)),
        }
    }
    Ok(terms)
}

/// Stoichiometric data structures derived from a vector of reaction equations:
/// the signed stoichiometric matrix (reactions x substances, negative for reagents,
/// positive for products) and separate matrices of concentration exponents for the
/// forward and reverse kinetic functions. All matrices are fixed once
/// `analyse_reactions` has run and are never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoichAnalyzer {
    /// vector of reaction equations
    pub reactions: Vec<String>,
    /// vector of substance names in order of first appearance
    pub substances: Vec<String>,
    /// signed stoichiometric coefficients, one row per reaction
    pub stoich_matrix: Vec<Vec<f64>>,
    /// concentration exponents of the forward kinetic function
    pub reagent_orders: Vec<Vec<f64>>,
    /// concentration exponents of the reverse kinetic function
    pub product_orders: Vec<Vec<f64>>,
    /// true for reactions written with "<=>"
    pub reversibility: Vec<bool>,
}

impl StoichAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses all reactions to collect substance names in order of first appearance.
    pub fn search_substances(&mut self) -> Result<(), ReactorError> {
        let mut substances: Vec<String> = Vec::new();
        for equation in &self.reactions {
            let (left, right, _) = split_equation(equation)?;
            for side in [left, right] {
                for (name, _) in parse_side(&side, equation)? {
                    if !substances.contains(&name) {
                        substances.push(name);
                    }
                }
            }
        }
        self.substances = substances;
        Ok(())
    }

    /// Builds the stoichiometric matrix and the forward/reverse exponent matrices.
    /// `search_substances` (or a manually filled substance list) must come first.
    pub fn analyse_reactions(&mut self) -> Result<(), ReactorError> {
        if self.substances.is_empty() {
            return Err(ReactorError::MissingData(
                "substances are not set: call search_substances first".to_string(),
            ));
        }
        let n = self.substances.len();
        let mut stoich_matrix = Vec::with_capacity(self.reactions.len());
        let mut reagent_orders = Vec::with_capacity(self.reactions.len());
        let mut product_orders = Vec::with_capacity(self.reactions.len());
        let mut reversibility = Vec::with_capacity(self.reactions.len());

        for equation in &self.reactions {
            let (left, right, reversible) = split_equation(equation)?;
            let reagents = parse_side(&left, equation)?;
            let products = parse_side(&right, equation)?;

            let mut nu_row = vec![0.0; n];
            let mut reag_row = vec![0.0; n];
            let mut prod_row = vec![0.0; n];
            for (name, coeff) in &reagents {
                let i = self.substance_index(name)?;
                nu_row[i] -= coeff;
                reag_row[i] += coeff;
            }
            for (name, coeff) in &products {
                let i = self.substance_index(name)?;
                nu_row[i] += coeff;
                prod_row[i] += coeff;
            }
            stoich_matrix.push(nu_row);
            reagent_orders.push(reag_row);
            product_orders.push(prod_row);
            reversibility.push(reversible);
        }

        self.stoich_matrix = stoich_matrix;
        self.reagent_orders = reagent_orders;
        self.product_orders = product_orders;
        self.reversibility = reversibility;
        Ok(())
    }

    pub fn substance_index(&self, name: &str) -> Result<usize, ReactorError> {
        self.substances
            .iter()
            .position(|s| s == name)
            .ok_or_else(|| {
                ReactorError::MissingData(format!("substance '{}' not found in substance list", name))
            })
    }
}
