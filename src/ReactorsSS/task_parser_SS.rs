//! Text-task parsing for steady-state CSTR problems.
//!
//! A task file consists of blank-line separated sections:
//!
//! ```text
//! DESCRIPTION
//! reversible A + B to C + D, liquid phase
//!
//! REACTIONS
//! A+B<=>C+D k1=0.02 Keq=1.44395809814
//! M+H2=>X+Me k=55.2 order:H2=0.5
//!
//! CONDITIONS
//! v0 0.01
//! V 10
//! C0 A 0.05
//! C0 B 0.05
//! C0 C 0
//! C0 D 0
//! ```
//!
//! A reaction line is the equation followed by key=value tokens: `k=` for an
//! irreversible law, `k1=` plus `Keq=` for a reversible one, and any number of
//! `order:SUBSTANCE=value` empirical order overrides.

use crate::Kinetics::rate_laws::RateLaw;
use crate::Kinetics::reaction_network::{Reaction, ReactionNetwork};
use crate::ReactorsSS::SimpleReactorSS::{CstrTask, ReactorError};
use std::collections::HashMap;

fn parse_f64(token: &str, line: &str) -> Result<f64, ReactorError> {
    token.parse::<f64>().map_err(|_| {
        ReactorError::ParseError(format!("bad number '{}' in line '{}'", token, line))
    })
}

fn parse_reaction_line(line: &str) -> Result<Reaction, ReactorError> {
    let mut parts = line.split_whitespace();
    let equation = parts
        .next()
        .ok_or_else(|| ReactorError::ParseError("empty reaction line".to_string()))?
        .to_string();

    let mut k: Option<f64> = None;
    let mut k1: Option<f64> = None;
    let mut keq: Option<f64> = None;
    let mut overrides: HashMap<String, f64> = HashMap::new();
    for token in parts {
        if let Some(rest) = token.strip_prefix("order:") {
            let (species, value) = rest.split_once('=').ok_or_else(|| {
                ReactorError::ParseError(format!("bad order token '{}' in '{}'", token, line))
            })?;
            overrides.insert(species.to_string(), parse_f64(value, line)?);
        } else if let Some(value) = token.strip_prefix("k1=") {
            k1 = Some(parse_f64(value, line)?);
        } else if let Some(value) = token.strip_prefix("Keq=") {
            keq = Some(parse_f64(value, line)?);
        } else if let Some(value) = token.strip_prefix("k=") {
            k = Some(parse_f64(value, line)?);
        } else {
            return Err(ReactorError::ParseError(format!(
                "unknown token '{}' in reaction line '{}'",
                token, line
            )));
        }
    }

    let rate_law = match (k, k1, keq) {
        (Some(k), None, None) => RateLaw::Irreversible { k },
        (None, Some(k1), Some(K_eq)) => RateLaw::Reversible { k1, K_eq },
        _ => {
            return Err(ReactorError::ParseError(format!(
                "reaction '{}' needs either k= or the pair k1= and Keq=",
                line
            )));
        }
    };

    let mut reaction = Reaction::new(&equation, rate_law);
    if !overrides.is_empty() {
        reaction = reaction.with_orders(overrides);
    }
    Ok(reaction)
}

impl CstrTask {
    /// Fills the task from the section-based text format described in the
    /// module docs.
    pub fn parse_from_str(&mut self, content: &str) -> Result<(), ReactorError> {
        let sections: Vec<&str> = content.split("\n\n").collect();
        let mut reactions: Vec<Reaction> = Vec::new();
        let mut inlet: HashMap<String, f64> = HashMap::new();
        let mut guess: HashMap<String, f64> = HashMap::new();

        for section in sections {
            let lines: Vec<&str> = section
                .lines()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .collect();
            if lines.is_empty() {
                continue;
            }
            match lines[0] {
                "DESCRIPTION" => {
                    self.set_problem_description(&lines[1..].join("\n"));
                }
                "REACTIONS" => {
                    for line in &lines[1..] {
                        reactions.push(parse_reaction_line(line)?);
                    }
                }
                "CONDITIONS" => {
                    for line in &lines[1..] {
                        let tokens: Vec<&str> = line.split_whitespace().collect();
                        match tokens.as_slice() {
                            ["v0", value] => self.v0 = parse_f64(value, line)?,
                            ["V", value] => self.V = parse_f64(value, line)?,
                            ["C0", species, value] => {
                                inlet.insert(species.to_string(), parse_f64(value, line)?);
                            }
                            ["guess", species, value] => {
                                guess.insert(species.to_string(), parse_f64(value, line)?);
                            }
                            ["tolerance", value] => self.tolerance = parse_f64(value, line)?,
                            ["max_iterations", value] => {
                                self.max_iterations = value.parse().map_err(|_| {
                                    ReactorError::ParseError(format!(
                                        "bad iteration count in line '{}'",
                                        line
                                    ))
                                })?;
                            }
                            _ => {
                                return Err(ReactorError::ParseError(format!(
                                    "unknown condition line '{}'",
                                    line
                                )));
                            }
                        }
                    }
                }
                _ => continue,
            }
        }

        if reactions.is_empty() {
            return Err(ReactorError::MissingData(
                "task file contains no REACTIONS section".to_string(),
            ));
        }
        self.set_network(ReactionNetwork::from_reactions(reactions)?);
        self.set_inlet_concentrations(inlet);
        if !guess.is_empty() {
            self.set_initial_guess(guess);
        }
        Ok(())
    }

    pub fn parse_from_file(&mut self, file_path: &str) -> Result<(), ReactorError> {
        let content = std::fs::read_to_string(file_path).map_err(|e| {
            ReactorError::ParseError(format!("cannot read task file {}: {}", file_path, e))
        })?;
        self.parse_from_str(&content)
    }
}
