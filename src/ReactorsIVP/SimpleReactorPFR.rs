use crate::Kinetics::reaction_network::ReactionNetwork;
use crate::ReactorsSS::SimpleReactorSS::ReactorError;
use RustedSciThe::numerical::ODE_api2::{SolverParam, SolverType, UniversalODESolver};
use RustedSciThe::symbolic::symbolic_engine::Expr;
use log::{info, warn};
use nalgebra::{DMatrix, DVector};
use prettytable::{Cell, Row, Table};
use std::collections::HashMap;

/// Flow samples below this fraction of the total inlet flow are unphysical;
/// negative samples above it are integrator noise.
const NEGATIVE_FLOW_FRACTION: f64 = 1e-6;

/// How the local volumetric flow rate responds to the reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowMode {
    /// Isothermal, isobaric gas: `v = v0 * F_tot / F_tot0`
    GasPhase,
    /// Liquid phase: `v = v0` along the whole reactor
    ConstantDensity,
}

/// Post-integration audit of a PFR profile.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionQuality {
    /// Number of stored mesh points
    pub n_points: usize,
    /// Samples where some molar flow dipped below zero (noise level)
    pub negative_flow_samples: usize,
    /// Smallest molar flow anywhere in the profile
    pub min_flow: f64,
    /// Largest relative deviation of the total molar flow from its inlet
    /// value; `Some` only when every reaction conserves total moles, where
    /// the deviation is pure integration error
    pub total_flow_drift: Option<f64>,
}

/// Plug-flow reactor task: a reaction network plus the feed (molar flows,
/// inlet volumetric flow), the volume span to integrate over and the ODE
/// solver settings.
///
/// Same workflow as the steady-state task: construct, fill with setters,
/// `check_task()`, `create_IVP_equations()`, `solve()`, then read the
/// profile or `outlet_flows()`.
#[allow(non_snake_case)]
pub struct PfrTask {
    /// Optional problem identifier
    pub problem_name: Option<String>,
    /// Optional problem description
    pub problem_description: Option<String>,
    /// Reactions, substances and stoichiometry
    pub network: Option<ReactionNetwork>,
    /// Inlet molar flow of every substance (absent substances are an error,
    /// zero is a valid value)
    pub inlet_flows: HashMap<String, f64>,
    /// Inlet volumetric flow rate
    pub v0: f64,
    /// Start of the volume span (usually 0)
    pub volume_start: f64,
    /// End of the volume span, the total reactor volume
    pub volume_end: f64,
    /// Gas-phase expansion or constant density
    pub flow_mode: FlowMode,
    /// ODE integrator family
    pub solver_type: SolverType,
    /// Integrator settings forwarded to the solver
    pub solver_params: HashMap<String, SolverParam>,
    /// Unknown names, `F_{substance}`, filled by create_IVP_equations
    pub unknowns: Vec<String>,
    /// Right-hand sides, same order as unknowns
    pub eq_system: Vec<Expr>,
    /// Volume mesh of the stored profile
    pub x_mesh: Option<DVector<f64>>,
    /// Flow profile, one row per mesh point, one column per unknown
    pub solution: Option<DMatrix<f64>>,
    /// Audit of the stored profile
    pub quality: Option<SolutionQuality>,
}

impl PfrTask {
    pub fn new(solver_type: SolverType) -> Self {
        let solver_params = HashMap::from([
            ("step_size".to_owned(), SolverParam::Float(1e-3)),
            ("tolerance".to_owned(), SolverParam::Float(1e-6)),
            ("max_iterations".to_owned(), SolverParam::Int(100000)),
            ("rtol".to_owned(), SolverParam::Float(1e-6)),
            ("atol".to_owned(), SolverParam::Float(1e-9)),
            ("max_step".to_owned(), SolverParam::Float(0.1)),
            ("first_step".to_owned(), SolverParam::OptionalFloat(None)),
            ("vectorized".to_owned(), SolverParam::Bool(false)),
            ("jac_sparsity".to_owned(), SolverParam::OptionalMatrix(None)),
            ("parallel".to_owned(), SolverParam::Bool(false)),
        ]);
        Self {
            problem_name: None,
            problem_description: None,
            network: None,
            inlet_flows: HashMap::new(),
            v0: 0.0,
            volume_start: 0.0,
            volume_end: 0.0,
            flow_mode: FlowMode::GasPhase,
            solver_type,
            solver_params,
            unknowns: Vec::new(),
            eq_system: Vec::new(),
            x_mesh: None,
            solution: None,
            quality: None,
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

    pub fn set_inlet_flows(&mut self, inlet: HashMap<String, f64>) {
        self.inlet_flows = inlet;
    }

    /// Inlet volumetric flow rate and the volume span to integrate over.
    pub fn set_operating_conditions(&mut self, v0: f64, volume_start: f64, volume_end: f64) {
        self.v0 = v0;
        self.volume_start = volume_start;
        self.volume_end = volume_end;
    }

    pub fn set_flow_mode(&mut self, flow_mode: FlowMode) {
        self.flow_mode = flow_mode;
    }

    pub fn set_solver_type(&mut self, solver_type: SolverType) {
        self.solver_type = solver_type;
    }

    /// Merges the given settings into the integrator defaults.
    pub fn set_solver_params(&mut self, params: HashMap<String, SolverParam>) {
        for (key, value) in params {
            self.solver_params.insert(key, value);
        }
    }

    pub fn unknown_name(substance: &str) -> String {
        format!("F_{}", substance)
    }

    /// Total molar flow at the inlet.
    pub fn total_inlet_flow(&self) -> f64 {
        self.inlet_flows.values().sum()
    }

    ///////////////////////////////////////////VALIDATION////////////////////////////////////////////////

    /// Validates the task configuration:
    /// - a reaction network is set
    /// - the inlet volumetric flow is positive
    /// - the volume span is non-degenerate
    /// - every substance has a finite, non-negative inlet molar flow
    /// - the total inlet molar flow is positive, so the local volumetric
    ///   flow of the gas-phase model never vanishes
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
        if !self.volume_start.is_finite()
            || !self.volume_end.is_finite()
            || self.volume_start < 0.0
            || self.volume_end <= self.volume_start
        {
            return Err(ReactorError::InvalidConfiguration(format!(
                "bad volume span [{}, {}]",
                self.volume_start, self.volume_end
            )));
        }
        for substance in network.substances() {
            let f0 = self.inlet_flows.get(substance).ok_or_else(|| {
                ReactorError::MissingData(format!("missing inlet flow for {}", substance))
            })?;
            if *f0 < 0.0 || !f0.is_finite() {
                return Err(ReactorError::InvalidConfiguration(format!(
                    "inlet flow of {} must be non-negative and finite, got {}",
                    substance, f0
                )));
            }
        }
        if self.total_inlet_flow() <= 0.0 {
            return Err(ReactorError::InvalidConfiguration(
                "total inlet molar flow is zero".to_string(),
            ));
        }
        Ok(())
    }

    /////////////////////////NUMERIC RIGHT-HAND SIDE///////////////////////////////////

    /// Local volumetric flow at a given total molar flow.
    fn local_volumetric_flow(&self, f_tot: f64) -> f64 {
        match self.flow_mode {
            FlowMode::GasPhase => self.v0 * f_tot / self.total_inlet_flow(),
            FlowMode::ConstantDensity => self.v0,
        }
    }

    /// Numeric right-hand side `dF_i/dV` at a candidate set of molar flows.
    /// Pure function: one evaluation per call, no integration state. A
    /// non-positive total flow makes the concentrations undefined and is a
    /// domain error.
    pub fn pfr_derivatives(
        &self,
        flows: &HashMap<String, f64>,
    ) -> Result<HashMap<String, f64>, ReactorError> {
        let network = self
            .network
            .as_ref()
            .ok_or_else(|| ReactorError::MissingData("reaction network not set".to_string()))?;
        let mut f_tot = 0.0;
        for substance in network.substances() {
            let f = flows.get(substance).ok_or_else(|| {
                ReactorError::MissingData(format!("missing molar flow for {}", substance))
            })?;
            f_tot += f;
        }
        if f_tot <= 0.0 {
            return Err(ReactorError::DomainError(format!(
                "total molar flow {} is not positive; concentrations are undefined",
                f_tot
            )));
        }
        let v = self.local_volumetric_flow(f_tot);
        let conc: HashMap<String, f64> = network
            .substances()
            .iter()
            .map(|s| (s.clone(), flows[s] / v))
            .collect();
        network.net_rates(&conc)
    }

    ///////////////////////////////////////////SOLVING////////////////////////////////////////////////

    /// Inlet molar flows in unknown order, the initial state of the IVP.
    pub fn initial_state(&self) -> DVector<f64> {
        let network = self.network.as_ref().unwrap();
        DVector::from_vec(
            network
                .substances()
                .iter()
                .map(|s| self.inlet_flows[s])
                .collect(),
        )
    }

    /// Integrates the molar flow balances over the volume span, stores the
    /// profile and audits it. The task is re-validated first, so setter
    /// calls made after the equations were built are still checked. A
    /// profile with a flow below the noise band (a fixed fraction of the
    /// total inlet flow) is rejected as a convergence failure.
    pub fn solve(&mut self) -> Result<(), ReactorError> {
        self.check_task()?;
        if self.eq_system.is_empty() {
            self.create_IVP_equations()?;
        }
        let y0 = self.initial_state();
        let mut ode = UniversalODESolver::new(
            self.eq_system.clone(),
            self.unknowns.clone(),
            "V".to_owned(),
            self.solver_type.clone(),
            self.volume_start,
            y0,
            self.volume_end,
        );
        ode.set_parameters(self.solver_params.clone());
        info!(
            "integrating PFR '{}' over V in [{}, {}]",
            self.problem_name.as_deref().unwrap_or("unnamed"),
            self.volume_start,
            self.volume_end
        );
        ode.initialize();
        ode.solve();
        let (x_mesh, solution) = ode.get_result();
        let x_mesh = x_mesh.ok_or_else(|| {
            ReactorError::CalculationError("integrator returned no volume mesh".to_string())
        })?;
        let solution = solution.ok_or_else(|| {
            ReactorError::CalculationError("integrator returned no flow profile".to_string())
        })?;

        let quality = self.audit_profile(&solution)?;
        info!(
            "PFR integration finished: {} points, min flow {:.3e}",
            quality.n_points, quality.min_flow
        );
        self.x_mesh = Some(x_mesh);
        self.solution = Some(solution);
        self.quality = Some(quality);
        Ok(())
    }

    /// Scans a profile for unphysical samples and, when the stoichiometry
    /// conserves total moles, measures the total-flow drift. An empty
    /// profile or one whose column count disagrees with the unknowns is
    /// rejected before any sample is read.
    pub fn audit_profile(&self, solution: &DMatrix<f64>) -> Result<SolutionQuality, ReactorError> {
        if solution.nrows() == 0 {
            return Err(ReactorError::ConvergenceError(
                "integrator returned an empty profile".to_string(),
            ));
        }
        if solution.ncols() != self.unknowns.len() {
            return Err(ReactorError::IndexOutOfBounds(format!(
                "profile has {} columns for {} unknowns",
                solution.ncols(),
                self.unknowns.len()
            )));
        }
        let f_tot0 = self.total_inlet_flow();
        let noise_floor = -NEGATIVE_FLOW_FRACTION * f_tot0;
        let mut negative_flow_samples = 0;
        let mut min_flow = f64::INFINITY;
        for i in 0..solution.nrows() {
            let mut row_has_negative = false;
            for j in 0..solution.ncols() {
                let f = solution[(i, j)];
                if !f.is_finite() {
                    return Err(ReactorError::ConvergenceError(format!(
                        "non-finite flow of {} in the profile",
                        self.unknowns[j]
                    )));
                }
                if f < noise_floor {
                    return Err(ReactorError::ConvergenceError(format!(
                        "unphysical negative flow {} = {:.6e} in the profile",
                        self.unknowns[j], f
                    )));
                }
                if f < 0.0 {
                    row_has_negative = true;
                }
                min_flow = min_flow.min(f);
            }
            if row_has_negative {
                negative_flow_samples += 1;
            }
        }
        if negative_flow_samples > 0 {
            warn!(
                "{} profile samples contain noise-level negative flows",
                negative_flow_samples
            );
        }

        let total_flow_drift = if self.conserves_total_moles() {
            let mut drift: f64 = 0.0;
            for i in 0..solution.nrows() {
                let f_tot: f64 = solution.row(i).iter().sum();
                drift = drift.max(((f_tot - f_tot0) / f_tot0).abs());
            }
            Some(drift)
        } else {
            None
        };
        Ok(SolutionQuality {
            n_points: solution.nrows(),
            negative_flow_samples,
            min_flow,
            total_flow_drift,
        })
    }

    /// True when every reaction takes as many moles in as it puts out.
    pub fn conserves_total_moles(&self) -> bool {
        match &self.network {
            Some(network) => network
                .stecheodata
                .stoich_matrix
                .iter()
                .all(|row| row.iter().sum::<f64>().abs() < 1e-12),
            None => false,
        }
    }

    ///////////////////////////INPUT/OUTPUT/////////////////////////////////////////////////////////

    /// Molar flows at the reactor outlet, keyed by substance.
    pub fn outlet_flows(&self) -> Result<HashMap<String, f64>, ReactorError> {
        let network = self
            .network
            .as_ref()
            .ok_or_else(|| ReactorError::MissingData("reaction network not set".to_string()))?;
        let solution = self.solution.as_ref().ok_or_else(|| {
            ReactorError::MissingData("no profile stored; call solve() first".to_string())
        })?;
        let last = solution.nrows().checked_sub(1).ok_or_else(|| {
            ReactorError::ConvergenceError("stored profile is empty".to_string())
        })?;
        Ok(network
            .substances()
            .iter()
            .enumerate()
            .map(|(j, s)| (s.clone(), solution[(last, j)].max(0.0)))
            .collect())
    }

    /// Concentrations at the reactor outlet, keyed by substance.
    pub fn outlet_concentrations(&self) -> Result<HashMap<String, f64>, ReactorError> {
        let flows = self.outlet_flows()?;
        let f_tot: f64 = flows.values().sum();
        if f_tot <= 0.0 {
            return Err(ReactorError::DomainError(
                "total outlet flow is not positive".to_string(),
            ));
        }
        let v = self.local_volumetric_flow(f_tot);
        Ok(flows.into_iter().map(|(s, f)| (s, f / v)).collect())
    }

    /// Outlet molar flows as a JSON map.
    pub fn solution_to_json(&self) -> Result<String, ReactorError> {
        let outlet = self.outlet_flows()?;
        serde_json::to_string_pretty(&outlet).map_err(|e| {
            ReactorError::CalculationError(format!("cannot serialize solution: {}", e))
        })
    }

    pub fn save_solution(&self, file_path: &str) -> Result<(), ReactorError> {
        let json = self.solution_to_json()?;
        std::fs::write(file_path, json).map_err(|e| {
            ReactorError::CalculationError(format!("cannot write {}: {}", file_path, e))
        })
    }

    /// Prints the inlet and outlet molar flows as a table.
    pub fn pretty_print_results(&self) -> Result<(), ReactorError> {
        let outlet = self.outlet_flows()?;
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("substance"),
            Cell::new("F inlet"),
            Cell::new("F outlet"),
        ]));
        if let Some(network) = &self.network {
            for substance in network.substances() {
                let inlet = self.inlet_flows.get(substance).copied().unwrap_or(f64::NAN);
                table.add_row(Row::new(vec![
                    Cell::new(substance),
                    Cell::new(&format!("{:.6}", inlet)),
                    Cell::new(&format!("{:.6}", outlet[substance])),
                ]));
            }
        }
        table.printstd();
        Ok(())
    }
}
