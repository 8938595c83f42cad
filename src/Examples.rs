//! Worked examples exercising the crate end to end: stoichiometric
//! analysis, steady-state CSTR solves and PFR integrations on classical
//! reactor-design problems.

pub mod reactor_examples;
