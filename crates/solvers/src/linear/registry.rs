use std::collections::BTreeMap;

use plenum_core::LinearSolver;
use thiserror::Error;

use super::{GaussSeidel, Pcg};

/// Builds a boxed linear solver.
pub type Factory = fn() -> Box<dyn LinearSolver>;

/// Errors that can occur when looking up a linear solver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown linear solver `{name}` (available: {available})")]
    Unknown { name: String, available: String },
}

/// Maps solver names to factories.
///
/// Solvers are looked up once, when a corrector context is built, and used
/// through the [`LinearSolver`] trait afterwards.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    factories: BTreeMap<String, Factory>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the solvers provided by this crate.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("PCG", || Box::new(Pcg));
        registry.register("GaussSeidel", || Box::new(GaussSeidel));
        registry
    }

    /// Registers a factory under `name`, returning any factory it replaces.
    pub fn register(&mut self, name: impl Into<String>, factory: Factory) -> Option<Factory> {
        self.factories.insert(name.into(), factory)
    }

    /// Returns `true` if a solver is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns the registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Builds the solver registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unknown`] if no solver has that name.
    pub fn build(&self, name: &str) -> Result<Box<dyn LinearSolver>, RegistryError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| RegistryError::Unknown {
                name: name.to_owned(),
                available: self.names().collect::<Vec<_>>().join(", "),
            })
    }
}
