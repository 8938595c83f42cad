//! Symbolic assembly of the PFR initial value problem. The unknowns are the
//! molar flows `F_{substance}`; concentrations are substituted as
//! `F_i / v(F)` before the rate laws are applied, so the assembled
//! right-hand sides depend on the flows alone.

use crate::ReactorsIVP::SimpleReactorPFR::{FlowMode, PfrTask};
use crate::ReactorsSS::SimpleReactorSS::ReactorError;
use RustedSciThe::symbolic::symbolic_engine::Expr;
use log::info;
use std::collections::HashMap;

impl PfrTask {
    /// Local volumetric flow as an expression in the flow unknowns:
    /// `v0 * (F_1 + ... + F_n) / F_tot0` for a gas, `v0` for a liquid.
    fn volumetric_flow_expr(&self) -> Expr {
        let network = self.network.as_ref().unwrap();
        match self.flow_mode {
            FlowMode::GasPhase => {
                let mut f_tot = Expr::Const(0.0);
                for substance in network.substances() {
                    f_tot = f_tot + Expr::Var(Self::unknown_name(substance));
                }
                Expr::Const(self.v0) * f_tot / Expr::Const(self.total_inlet_flow())
            }
            FlowMode::ConstantDensity => Expr::Const(self.v0),
        }
    }

    /// Builds one balance `dF_i/dV = R_i` per substance. The builder only
    /// assembles expressions; it performs no integration and touches no
    /// state besides `unknowns`/`eq_system`.
    #[allow(non_snake_case)]
    pub fn create_IVP_equations(&mut self) -> Result<(), ReactorError> {
        self.check_task()?;
        let network = self.network.as_ref().unwrap();

        let v_expr = self.volumetric_flow_expr();
        let conc_exprs: HashMap<String, Expr> = network
            .substances()
            .iter()
            .map(|s| {
                (
                    s.clone(),
                    Expr::Var(Self::unknown_name(s)) / v_expr.clone(),
                )
            })
            .collect();
        let net_rates = network.net_rate_exprs(&conc_exprs)?;

        let mut unknowns = Vec::with_capacity(network.n_substances());
        let mut eq_system = Vec::with_capacity(network.n_substances());
        for substance in network.substances() {
            let Ri = net_rates
                .get(substance)
                .ok_or_else(|| {
                    ReactorError::CalculationError(format!(
                        "no net rate expression for {}",
                        substance
                    ))
                })?
                .clone();
            unknowns.push(Self::unknown_name(substance));
            eq_system.push(Ri.simplify());
        }
        self.unknowns = unknowns;
        self.eq_system = eq_system;
        info!(
            "created {} PFR balances for {} substances",
            self.eq_system.len(),
            self.unknowns.len()
        );
        Ok(())
    }
}
