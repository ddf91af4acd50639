//! Capability traits for generic observers.
//!
//! These traits abstract over event and action types, so an observer can be
//! written once and reused wherever the capabilities it needs are available.
//!
//! # Event traits
//!
//! - [`HasResidual`] — events that carry a linear solver residual
//!
//! # Action traits
//!
//! - [`CanStopEarly`] — actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use plenum_core::Observer;
//! use plenum_observers::traits::{CanStopEarly, HasResidual};
//!
//! /// Stops once a pass starts from a small enough residual.
//! struct GoodEnough {
//!     tolerance: f64,
//! }
//!
//! impl<E: HasResidual, A: CanStopEarly> Observer<E, A> for GoodEnough {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         if event.residual() < self.tolerance {
//!             return Some(A::stop_early());
//!         }
//!         None
//!     }
//! }
//! ```

use plenum_core::SolveReport;
use plenum_solvers::pressure;

/// An event that carries a residual value.
pub trait HasResidual {
    /// Returns the residual for this event.
    ///
    /// Returns `f64::NAN` when the event carries no residual.
    fn residual(&self) -> f64;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the solver early.
    fn stop_early() -> Self;
}

/// The initial residual of the linear solve, which measures how far the
/// pass started from satisfying its equation.
impl HasResidual for SolveReport {
    fn residual(&self) -> f64 {
        self.initial_residual
    }
}

impl HasResidual for pressure::Event<'_> {
    fn residual(&self) -> f64 {
        self.report().map_or(f64::NAN, HasResidual::residual)
    }
}

impl CanStopEarly for pressure::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
