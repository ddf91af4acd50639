use plenum_core::{FaceField, ScalarField, SolveReport, VectorField};

use crate::continuity::ContinuityErrors;

use super::CorrectionState;

/// Event emitted by the pressure corrector.
#[derive(Debug)]
pub enum Event<'a> {
    /// A pressure pass has been solved and its flux reconciled.
    Solved {
        /// Loop state after recording this pass.
        state: &'a CorrectionState,
        /// Name of the linear solver used for this pass.
        solver: &'a str,
        /// Outcome of the linear solve.
        report: &'a SolveReport,
        /// Pressure after leveling to the reference, before relaxation.
        pressure: &'a ScalarField,
        /// Flux reconciled with this pass's pressure.
        flux: &'a FaceField,
    },

    /// The final pass is done and the fields are corrected.
    ///
    /// Any action returned for this event is ignored.
    Finalized {
        state: &'a CorrectionState,
        continuity: &'a ContinuityErrors,
        /// Relaxed pressure.
        pressure: &'a ScalarField,
        /// Corrected velocity.
        velocity: &'a VectorField,
    },
}

impl<'a> Event<'a> {
    /// Returns the loop state at the time of the event.
    #[must_use]
    pub fn state(&self) -> &'a CorrectionState {
        match self {
            Event::Solved { state, .. } | Event::Finalized { state, .. } => *state,
        }
    }

    /// Returns the pressure field carried by the event.
    #[must_use]
    pub fn pressure(&self) -> &'a ScalarField {
        match self {
            Event::Solved { pressure, .. } | Event::Finalized { pressure, .. } => *pressure,
        }
    }

    /// Returns the linear solve report for [`Event::Solved`].
    #[must_use]
    pub fn report(&self) -> Option<&'a SolveReport> {
        match self {
            Event::Solved { report, .. } => Some(*report),
            Event::Finalized { .. } => None,
        }
    }
}
