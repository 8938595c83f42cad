//! # Steady-State Reactor (CSTR) Module
//!
//! Solvers for steady-state continuous stirred-tank reactor compositions.
//!
//! ## Mathematical Model
//!
//! A CSTR at steady state has uniform composition equal to the outlet
//! composition, so each substance obeys an algebraic mole balance
//!
//! ```text
//! 0 = v0*(C_i0 - C_i) + V*R_i(C)
//! ```
//!
//! Where:
//! - `v0` - volumetric flow rate through the reactor
//! - `V` - reactor volume
//! - `C_i0`, `C_i` - inlet and outlet concentration of substance i
//! - `R_i = SUM_j(nu_ij * r_j)` - net production rate of substance i
//!
//! The residuals of all substances are driven to zero simultaneously by the
//! Newton-Raphson nonlinear solver of the
//! [RustedSciThe](https://crates.io/crates/RustedSciThe) package. Solutions
//! are accepted only when the solver converged and every returned
//! concentration is finite and non-negative; otherwise the caller gets a
//! convergence error and should retry with a different initial guess.

pub mod SimpleReactorSS;
pub mod task_parser_SS;
mod simple_reactor_ss_tests;
