use plenum_core::{FaceField, ScalarField, SolveReport, VectorField};

use crate::continuity::ContinuityErrors;

/// How the corrector finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every pass ran and every linear solve converged.
    Complete,

    /// Every pass ran, but at least one linear solve hit its iteration limit.
    ///
    /// The returned fields are a best effort.
    Unconverged,

    /// Stopped early due to an observer decision.
    StoppedByObserver,
}

/// Record of one pressure pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    /// Pass index, starting at zero.
    pub pass: usize,
    pub is_final: bool,
    /// Name of the linear solver used.
    pub solver: String,
    pub report: SolveReport,
}

/// The result of a pressure correction.
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: Status,
    /// Corrected velocity, or the predicted velocity if stopped early.
    pub velocity: VectorField,
    /// Reconciled face flux from the last solved pass.
    pub flux: FaceField,
    pub pressure: ScalarField,
    /// One report per solved pass, in order.
    pub passes: Vec<PassReport>,
    /// Continuity errors of the final flux, unless stopped early.
    pub continuity: Option<ContinuityErrors>,
}

impl Solution {
    /// Returns the number of passes that were solved.
    #[must_use]
    pub fn n_passes(&self) -> usize {
        self.passes.len()
    }
}
