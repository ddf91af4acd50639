use serde::Deserialize;
use thiserror::Error;

use plenum_core::{ControlsError, SolverControls};

use crate::{
    reference::ReferenceCell,
    relaxation::{RelaxationError, RelaxationFactor, RelaxationFactors},
};

/// Name under which pressure relaxation factors are looked up.
const PRESSURE: &str = "p";

/// Configuration for the pressure corrector.
///
/// Built programmatically with [`Config::new`] and the `with_*` methods, or
/// loaded from TOML with [`Config::from_toml_str`]:
///
/// ```toml
/// n_non_orth_correctors = 1
/// time_step = 1.0
///
/// [reference]
/// cell = 0
/// value = 0.0
///
/// [relaxation.fields]
/// p = 0.3
///
/// [relaxation.equations]
/// U = 0.7
///
/// [solvers.p]
/// solver = "PCG"
/// tolerance = 1e-6
/// rel_tol = 0.05
/// max_iters = 1000
///
/// [solvers.p_final]
/// solver = "PCG"
/// tolerance = 1e-6
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct Config {
    n_non_orth_correctors: usize,
    pressure_relaxation: RelaxationFactor,
    reference: Option<ReferenceCell>,
    solver: SolverSettings,
    final_solver: Option<SolverSettings>,
    time_step: f64,
    relaxation_factors: RelaxationFactors,
}

/// Errors that can occur when validating a corrector config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid pressure relaxation: {0}")]
    Relaxation(#[from] RelaxationError),

    #[error("invalid solver controls: {0}")]
    Controls(#[from] ControlsError),

    #[error("solver name must not be empty")]
    EmptySolverName,

    #[error("time_step must be positive and finite, found {0}")]
    TimeStep(f64),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(0, 1.0).unwrap()
    }
}

impl Config {
    /// Creates a config with the given number of extra non-orthogonal passes
    /// and explicit pressure relaxation factor.
    ///
    /// The linear solver defaults to `"PCG"` with default controls, the final
    /// pass uses the same solver without a relative tolerance, no reference
    /// cell is set, and the time step is `1`.
    ///
    /// # Errors
    ///
    /// Returns an error if the relaxation factor is outside `(0, 1]`.
    pub fn new(n_non_orth_correctors: usize, pressure_relaxation: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            n_non_orth_correctors,
            pressure_relaxation: RelaxationFactor::bounded(pressure_relaxation)?,
            reference: None,
            solver: SolverSettings::default(),
            final_solver: None,
            time_step: 1.0,
            relaxation_factors: RelaxationFactors::new(),
        })
    }

    /// Parses and validates a TOML config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, unknown keys, or
    /// values of the wrong type (such as a negative pass count), and the
    /// matching validation error otherwise.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(s)?;
        Self::try_from(raw)
    }

    /// Sets the cell used to pin the pressure level when no boundary fixes it.
    #[must_use]
    pub fn with_reference(mut self, reference: ReferenceCell) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Sets the linear solver used on every pass but the final one.
    #[must_use]
    pub fn with_solver(mut self, solver: SolverSettings) -> Self {
        self.solver = solver;
        self
    }

    /// Sets the linear solver used on the final pass.
    #[must_use]
    pub fn with_final_solver(mut self, solver: SolverSettings) -> Self {
        self.final_solver = Some(solver);
        self
    }

    /// Stores the full relaxation table for the rest of the outer iteration.
    ///
    /// The corrector itself only uses the pressure factor given to
    /// [`Config::new`]; equation factors (such as `U`) are kept for the
    /// momentum predictor.
    #[must_use]
    pub fn with_relaxation_factors(mut self, factors: RelaxationFactors) -> Self {
        self.relaxation_factors = factors;
        self
    }

    /// Sets the time step used to scale continuity errors.
    ///
    /// # Errors
    ///
    /// Returns an error if `dt` is not positive and finite.
    pub fn with_time_step(mut self, dt: f64) -> Result<Self, ConfigError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ConfigError::TimeStep(dt));
        }
        self.time_step = dt;
        Ok(self)
    }

    /// Returns the number of passes after the first.
    #[must_use]
    pub fn n_non_orth_correctors(&self) -> usize {
        self.n_non_orth_correctors
    }

    /// Returns the total number of pressure passes.
    #[must_use]
    pub fn n_passes(&self) -> usize {
        self.n_non_orth_correctors + 1
    }

    #[must_use]
    pub fn pressure_relaxation(&self) -> RelaxationFactor {
        self.pressure_relaxation
    }

    #[must_use]
    pub fn reference(&self) -> Option<ReferenceCell> {
        self.reference
    }

    #[must_use]
    pub fn solver(&self) -> &SolverSettings {
        &self.solver
    }

    /// Returns the final-pass solver, defaulting to the regular solver with
    /// its relative tolerance disabled.
    #[must_use]
    pub fn final_solver(&self) -> SolverSettings {
        self.final_solver.clone().unwrap_or_else(|| SolverSettings {
            name: self.solver.name.clone(),
            controls: self.solver.controls.without_rel_tol(),
        })
    }

    #[must_use]
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Returns the relaxation table loaded with this config.
    #[must_use]
    pub fn relaxation_factors(&self) -> &RelaxationFactors {
        &self.relaxation_factors
    }
}

/// A linear solver name and its convergence controls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawSolver")]
pub struct SolverSettings {
    name: String,
    controls: SolverControls,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            name: "PCG".to_owned(),
            controls: SolverControls::default(),
        }
    }
}

impl SolverSettings {
    /// Creates solver settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty.
    pub fn new(name: impl Into<String>, controls: SolverControls) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigError::EmptySolverName);
        }
        Ok(Self { name, controls })
    }

    /// Returns the registry name of the solver.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn controls(&self) -> SolverControls {
        self.controls
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    n_non_orth_correctors: usize,
    #[serde(default)]
    reference: Option<ReferenceCell>,
    #[serde(default)]
    relaxation: RelaxationFactors,
    #[serde(default)]
    solvers: RawSolvers,
    #[serde(default = "default_time_step")]
    time_step: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSolvers {
    p: Option<SolverSettings>,
    p_final: Option<SolverSettings>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSolver {
    #[serde(default = "default_solver")]
    solver: String,
    #[serde(default = "default_tolerance")]
    tolerance: f64,
    #[serde(default)]
    rel_tol: f64,
    #[serde(default = "default_max_iters")]
    max_iters: usize,
}

fn default_time_step() -> f64 {
    1.0
}

fn default_solver() -> String {
    SolverSettings::default().name
}

fn default_tolerance() -> f64 {
    SolverControls::default().tolerance()
}

fn default_max_iters() -> usize {
    SolverControls::default().max_iters()
}

impl TryFrom<RawSolver> for SolverSettings {
    type Error = ConfigError;

    fn try_from(raw: RawSolver) -> Result<Self, Self::Error> {
        let controls = SolverControls::new(raw.tolerance, raw.rel_tol, raw.max_iters)?;
        Self::new(raw.solver, controls)
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let relaxation = raw
            .relaxation
            .field(PRESSURE)
            .unwrap_or(RelaxationFactor::NONE);

        let mut config = Self::new(raw.n_non_orth_correctors, relaxation.value())?
            .with_time_step(raw.time_step)?
            .with_relaxation_factors(raw.relaxation);
        if let Some(reference) = raw.reference {
            config = config.with_reference(reference);
        }
        if let Some(solver) = raw.solvers.p {
            config = config.with_solver(solver);
        }
        if let Some(solver) = raw.solvers.p_final {
            config = config.with_final_solver(solver);
        }
        Ok(config)
    }
}
