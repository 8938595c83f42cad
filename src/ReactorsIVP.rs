//! # Plug-Flow Reactor (PFR) Module
//!
//! Solvers for isothermal, isobaric plug-flow reactor profiles.
//!
//! ## Mathematical Model
//!
//! The design equation of a PFR is an initial value problem in the reactor
//! volume coordinate, one molar flow balance per substance
//!
//! ```text
//! dF_i/dV = R_i(C),   F_i(0) = F_i0
//! ```
//!
//! Where:
//! - `F_i` - molar flow rate of substance i
//! - `V` - reactor volume traversed so far
//! - `R_i = SUM_j(nu_ij * r_j)` - net production rate of substance i
//! - `C_i = F_i / v` - local concentration, `v` the local volumetric flow
//!
//! For a gas-phase mixture at constant temperature and pressure the
//! volumetric flow expands with the total molar flow,
//! `v = v0 * F_tot / F_tot0`; for constant-density (liquid) operation
//! `v = v0` throughout.
//!
//! The system is integrated by the `UniversalODESolver` of the
//! [RustedSciThe](https://crates.io/crates/RustedSciThe) package (BDF by
//! default, switchable to Backward Euler, Radau or explicit RK). After the
//! integration the stored profile is audited: negative flow samples and the
//! drift of the total molar flow (for mole-conserving networks) are recorded
//! in a [`SimpleReactorPFR::SolutionQuality`] report.

pub mod SimpleReactorPFR;
pub mod createIVP;
