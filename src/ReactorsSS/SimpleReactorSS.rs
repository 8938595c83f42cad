use crate::Kinetics::reaction_network::ReactionNetwork;
use RustedSciThe::numerical::Nonlinear_systems::NR::{Method, NR};
use RustedSciThe::symbolic::symbolic_engine::Expr;
use log::{info, warn};
use prettytable::{Cell, Row, Table};
use std::collections::HashMap;
use thiserror::Error;

/// Upper bound handed to the nonlinear solver for concentration unknowns.
const CONC_UPPER_BOUND: f64 = 1e20;
/// Solutions with components below this are unphysical; above it and below
/// zero they are numerical noise and get clipped.
const NEGATIVE_SOLUTION_TOL: f64 = -1e-8;

/// Error type shared by all reactor modules of this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReactorError {
    #[error("Missing data: {0}")]
    MissingData(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Domain error: {0}")]
    DomainError(String),
    #[error("Convergence failure: {0}")]
    ConvergenceError(String),
    #[error("Calculation error: {0}")]
    CalculationError(String),
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(String),
}

/// Steady-state CSTR task: a reaction network plus the operating point
/// (inlet composition, volumetric flow, reactor volume) and the settings of
/// the nonlinear solve.
///
/// The workflow mirrors the other reactor tasks of this crate:
/// construct, fill with setters, `check_task()`, `create_SS_equations()`,
/// `solve()`, then read `map_of_solutions`.
#[allow(non_snake_case)]
pub struct CstrTask {
    /// Optional problem identifier
    pub problem_name: Option<String>,
    /// Optional problem description
    pub problem_description: Option<String>,
    /// Reactions, substances and stoichiometry
    pub network: Option<ReactionNetwork>,
    /// Inlet concentration of every substance (absent substances are an error,
    /// zero is a valid value)
    pub inlet_concentrations: HashMap<String, f64>,
    /// Volumetric flow rate through the reactor
    pub v0: f64,
    /// Reactor volume
    pub V: f64,
    /// Starting point of the Newton iteration, keyed by substance
    pub initial_guess: Option<HashMap<String, f64>>,
    /// Solver bounds per substance; defaults to [0, inf) so iterates stay in
    /// the rate-law domain
    pub bounds: Option<HashMap<String, (f64, f64)>>,
    /// Newton tolerance
    pub tolerance: f64,
    /// Newton iteration budget
    pub max_iterations: usize,
    /// Optional damping factor forwarded to the solver
    pub damping_factor: Option<f64>,
    /// Optional solver method forwarded to the solver
    pub method: Option<Method>,
    /// Unknown names, one per substance, filled by create_SS_equations
    pub unknowns: Vec<String>,
    /// Symbolic residuals, same order as unknowns
    pub eq_system: Vec<Expr>,
    /// Solved outlet composition, keyed by substance
    pub map_of_solutions: HashMap<String, f64>,
}

impl CstrTask {
    pub fn new() -> Self {
        Self {
            problem_name: None,
            problem_description: None,
            network: None,
            inlet_concentrations: HashMap::new(),
            v0: 0.0,
            V: 0.0,
            initial_guess: None,
            bounds: None,
            tolerance: 1e-8,
            max_iterations: 200,
            damping_factor: None,
            method: None,
            unknowns: Vec::new(),
            eq_system: Vec::new(),
            map_of_solutions: HashMap::new(),
        }
    }

    /////////////////////////////////SETTERS////////////////////////////////////////////////

    pub fn set_problem_name(&mut self, name: &str) {
        self.problem_name = Some(name.to_string());
    }

    pub fn set_problem_description(&mut self, description: &str) {
        self.problem_description = Some(description.to_string());
    }

    pub fn set_network(&mut self, network: ReactionNetwork) {
        self.network = Some(network);
    }

    /// Volumetric flow rate and reactor volume.
    #[allow(non_snake_case)]
    pub fn set_operating_conditions(&mut self, v0: f64, V: f64) {
        self.v0 = v0;
        self.V = V;
    }

    pub fn set_inlet_concentrations(&mut self, inlet: HashMap<String, f64>) {
        self.inlet_concentrations = inlet;
    }

    pub fn set_initial_guess(&mut self, guess: HashMap<String, f64>) {
        self.initial_guess = Some(guess);
    }

    pub fn set_bounds(&mut self, bounds: HashMap<String, (f64, f64)>) {
        self.bounds = Some(bounds);
    }

    pub fn set_solver_settings(
        &mut self,
        tolerance: f64,
        max_iterations: usize,
        damping_factor: Option<f64>,
        method: Option<Method>,
    ) {
        self.tolerance = tolerance;
        self.max_iterations = max_iterations;
        self.damping_factor = damping_factor;
        self.method = method;
    }

    /// tau = V/v0
    pub fn residence_time(&self) -> f64 {
        self.V / self.v0
    }

    ///////////////////////////////////////////VALIDATION////////////////////////////////////////////////

    /// Validates the task configuration:
    /// - a reaction network is set
    /// - flow rate and volume are positive
    /// - every substance has a finite, non-negative inlet concentration
    /// - at least one inlet concentration is positive
    pub fn check_task(&self) -> Result<(), ReactorError> {
        let network = self
            .network
            .as_ref()
            .ok_or_else(|| ReactorError::MissingData("reaction network not set".to_string()))?;
        if self.v0 <= 0.0 || !self.v0.is_finite() {
            return Err(ReactorError::MissingData(
                "v0 must be positive".to_string(),
            ));
        }
        if self.V <= 0.0 || !self.V.is_finite() {
            return Err(ReactorError::MissingData("V must be positive".to_string()));
        }
        let mut total_inlet = 0.0;
        for substance in network.substances() {
            let c0 = self.inlet_concentrations.get(substance).ok_or_else(|| {
                ReactorError::MissingData(format!(
                    "missing inlet concentration for {}",
                    substance
                ))
            })?;
            if *c0 < 0.0 || !c0.is_finite() {
                return Err(ReactorError::InvalidConfiguration(format!(
                    "inlet concentration of {} must be non-negative and finite, got {}",
                    substance, c0
                )));
            }
            total_inlet += c0;
        }
        if total_inlet <= 0.0 {
            return Err(ReactorError::InvalidConfiguration(
                "all inlet concentrations are zero".to_string(),
            ));
        }
        if let Some(guess) = &self.initial_guess {
            for substance in network.substances() {
                if !guess.contains_key(substance) {
                    return Err(ReactorError::MissingData(format!(
                        "initial guess is missing substance {}",
                        substance
                    )));
                }
            }
        }
        Ok(())
    }

    /////////////////////////CREATING SYMBOLIC EQUATIONS///////////////////////////////////

    /// Builds one residual per substance,
    /// `v0*(C_i0 - C_i) + V*R_i`, with the substance names themselves as the
    /// unknown variables. The builder only assembles expressions; it performs
    /// no iteration and touches no state besides `unknowns`/`eq_system`.
    #[allow(non_snake_case)]
    pub fn create_SS_equations(&mut self) -> Result<(), ReactorError> {
        self.check_task()?;
        let network = self.network.as_ref().unwrap();

        let conc_exprs = network.plain_conc_exprs();
        let net_rates = network.net_rate_exprs(&conc_exprs)?;

        let mut unknowns = Vec::with_capacity(network.n_substances());
        let mut eq_system = Vec::with_capacity(network.n_substances());
        for substance in network.substances() {
            let c0 = self.inlet_concentrations[substance];
            let Ri = net_rates
                .get(substance)
                .ok_or_else(|| {
                    ReactorError::CalculationError(format!(
                        "no net rate expression for {}",
                        substance
                    ))
                })?
                .clone();
            let residual = Expr::Const(self.v0)
                * (Expr::Const(c0) - Expr::Var(substance.clone()))
                + Expr::Const(self.V) * Ri;
            unknowns.push(substance.clone());
            eq_system.push(residual.simplify());
        }
        self.unknowns = unknowns;
        self.eq_system = eq_system;
        info!(
            "created {} CSTR residuals for {} substances",
            self.eq_system.len(),
            self.unknowns.len()
        );
        Ok(())
    }

    /// Numeric residual evaluation at a candidate composition. Pure function:
    /// one evaluation per call, no iteration, no hidden state.
    pub fn ss_residuals(
        &self,
        conc: &HashMap<String, f64>,
    ) -> Result<HashMap<String, f64>, ReactorError> {
        let network = self
            .network
            .as_ref()
            .ok_or_else(|| ReactorError::MissingData("reaction network not set".to_string()))?;
        let net_rates = network.net_rates(conc)?;
        let mut residuals = HashMap::new();
        for substance in network.substances() {
            let c0 = self.inlet_concentrations.get(substance).ok_or_else(|| {
                ReactorError::MissingData(format!(
                    "missing inlet concentration for {}",
                    substance
                ))
            })?;
            let c = conc.get(substance).ok_or_else(|| {
                ReactorError::MissingData(format!("missing concentration for {}", substance))
            })?;
            residuals.insert(
                substance.clone(),
                self.v0 * (c0 - c) + self.V * net_rates[substance],
            );
        }
        Ok(residuals)
    }

    ///////////////////////////////////////////SOLVING////////////////////////////////////////////////

    /// Default starting point: the inlet composition, with zero entries lifted
    /// to a tenth of the mean positive inlet concentration so the Newton
    /// iteration does not start on the domain boundary.
    fn default_initial_guess(&self) -> Vec<f64> {
        let network = self.network.as_ref().unwrap();
        let positive: Vec<f64> = network
            .substances()
            .iter()
            .map(|s| self.inlet_concentrations[s])
            .filter(|c| *c > 0.0)
            .collect();
        let floor = 0.1 * positive.iter().sum::<f64>() / positive.len() as f64;
        network
            .substances()
            .iter()
            .map(|s| {
                let c0 = self.inlet_concentrations[s];
                if c0 > 0.0 { c0 } else { floor }
            })
            .collect()
    }

    fn solver_bounds(&self) -> HashMap<String, (f64, f64)> {
        match &self.bounds {
            Some(bounds) => bounds.clone(),
            None => self
                .unknowns
                .iter()
                .map(|u| (u.clone(), (0.0, CONC_UPPER_BOUND)))
                .collect(),
        }
    }

    /// Runs the Newton-Raphson solve and validates the result. The task is
    /// re-validated first, so setter calls made after the equations were
    /// built are still checked. A missing solver result is a convergence
    /// failure; so is a solution with negative or non-finite components. No
    /// automatic retry: a failed solve usually needs a different initial
    /// guess, which is the caller's call.
    pub fn solve(&mut self) -> Result<&HashMap<String, f64>, ReactorError> {
        self.check_task()?;
        if self.eq_system.is_empty() {
            self.create_SS_equations()?;
        }
        let initial_guess: Vec<f64> = match &self.initial_guess {
            Some(guess) => self.unknowns.iter().map(|u| guess[u]).collect(),
            None => self.default_initial_guess(),
        };

        let mut solver = NR::new();
        solver.set_equation_system(
            self.eq_system.clone(),
            Some(self.unknowns.clone()),
            initial_guess,
            self.tolerance,
            self.max_iterations,
        );
        solver.set_solver_params(
            Some("info".to_string()),
            None,
            self.damping_factor,
            Some(self.solver_bounds()),
            self.method.clone(),
            None,
        );
        solver.eq_generate();
        info!(
            "solving steady-state CSTR '{}' with tau = {:.6}",
            self.problem_name.as_deref().unwrap_or("unnamed"),
            self.residence_time()
        );
        solver.solve();
        let solution = solver.get_result().ok_or_else(|| {
            ReactorError::ConvergenceError(
                "root finder returned no solution; try another initial guess".to_string(),
            )
        })?;

        let mut map_of_solutions = HashMap::new();
        for (unknown, value) in self.unknowns.iter().zip(solution.iter()) {
            if !value.is_finite() {
                return Err(ReactorError::ConvergenceError(format!(
                    "non-finite concentration for {}",
                    unknown
                )));
            }
            if *value < NEGATIVE_SOLUTION_TOL {
                return Err(ReactorError::ConvergenceError(format!(
                    "unphysical negative concentration {} = {:.6e}",
                    unknown, value
                )));
            }
            if *value < 0.0 {
                warn!("clipping noise-level negative concentration of {}", unknown);
            }
            map_of_solutions.insert(unknown.clone(), value.max(0.0));
        }
        self.map_of_solutions = map_of_solutions;
        info!("steady-state solve finished");
        Ok(&self.map_of_solutions)
    }

    ///////////////////////////INPUT/OUTPUT/////////////////////////////////////////////////////////

    /// Solved outlet composition as a JSON map.
    pub fn solution_to_json(&self) -> Result<String, ReactorError> {
        if self.map_of_solutions.is_empty() {
            return Err(ReactorError::MissingData(
                "no solution stored; call solve() first".to_string(),
            ));
        }
        serde_json::to_string_pretty(&self.map_of_solutions).map_err(|e| {
            ReactorError::CalculationError(format!("cannot serialize solution: {}", e))
        })
    }

    pub fn save_solution(&self, file_path: &str) -> Result<(), ReactorError> {
        let json = self.solution_to_json()?;
        std::fs::write(file_path, json).map_err(|e| {
            ReactorError::CalculationError(format!("cannot write {}: {}", file_path, e))
        })
    }

    /// Prints the inlet and solved outlet composition as a table.
    pub fn pretty_print_results(&self) {
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("substance"),
            Cell::new("C inlet"),
            Cell::new("C outlet"),
        ]));
        if let Some(network) = &self.network {
            for substance in network.substances() {
                let inlet = self
                    .inlet_concentrations
                    .get(substance)
                    .copied()
                    .unwrap_or(f64::NAN);
                let outlet = self
                    .map_of_solutions
                    .get(substance)
                    .copied()
                    .unwrap_or(f64::NAN);
                table.add_row(Row::new(vec![
                    Cell::new(substance),
                    Cell::new(&format!("{:.6}", inlet)),
                    Cell::new(&format!("{:.6}", outlet)),
                ]));
            }
        }
        table.printstd();
    }
}

impl Default for CstrTask {
    fn default() -> Self {
        Self::new()
    }
}
