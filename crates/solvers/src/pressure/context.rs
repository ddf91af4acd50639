use std::fmt;

use thiserror::Error;

use plenum_core::{LinearSolver, Mesh};

use crate::linear::{Registry, RegistryError};

use super::Config;

/// Errors that can occur when building a corrector context.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("reference cell {cell} is out of range for a mesh with {n_cells} cells")]
    ReferenceOutOfRange { cell: usize, n_cells: usize },
}

/// Everything the corrector needs that does not change between invocations.
///
/// Holds the mesh, the validated config, and the linear solvers resolved
/// from the config by name.
pub struct Context {
    mesh: Mesh,
    config: Config,
    solver: Box<dyn LinearSolver>,
    final_solver: Box<dyn LinearSolver>,
}

impl Context {
    /// Resolves the configured solvers and checks the config against the mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if a solver name is not registered or the reference
    /// cell lies outside the mesh.
    pub fn new(mesh: Mesh, config: Config, registry: &Registry) -> Result<Self, ContextError> {
        if let Some(reference) = config.reference()
            && reference.cell >= mesh.n_cells()
        {
            return Err(ContextError::ReferenceOutOfRange {
                cell: reference.cell,
                n_cells: mesh.n_cells(),
            });
        }
        let solver = registry.build(config.solver().name())?;
        let final_solver = registry.build(config.final_solver().name())?;
        Ok(Self {
            mesh,
            config,
            solver,
            final_solver,
        })
    }

    #[must_use]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the solver for every pass but the final one.
    #[must_use]
    pub fn solver(&self) -> &dyn LinearSolver {
        self.solver.as_ref()
    }

    #[must_use]
    pub fn final_solver(&self) -> &dyn LinearSolver {
        self.final_solver.as_ref()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("mesh", &self.mesh)
            .field("config", &self.config)
            .field("solver", &self.solver.name())
            .field("final_solver", &self.final_solver.name())
            .finish()
    }
}
