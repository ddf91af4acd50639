use plenum_core::SolveReport;

use super::Status;

/// Where the corrector is in its sequence of passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The momentum prediction is available; no pass has been solved.
    PredictDone,

    /// At least one pressure pass has been solved.
    NonOrthoLoop,

    /// Pressure is relaxed and velocity corrected.
    Finalized,
}

/// Loop state of a single corrector invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionState {
    phase: Phase,
    pass: usize,
    n_passes: usize,
    residual: f64,
    all_converged: bool,
}

impl CorrectionState {
    /// Creates the state for a run of `n_passes` passes (at least one).
    pub(super) fn new(n_passes: usize) -> Self {
        Self {
            phase: Phase::PredictDone,
            pass: 0,
            n_passes: n_passes.max(1),
            residual: 0.0,
            all_converged: true,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the current pass index, starting at zero.
    #[must_use]
    pub fn pass(&self) -> usize {
        self.pass
    }

    #[must_use]
    pub fn n_passes(&self) -> usize {
        self.n_passes
    }

    /// Returns `true` if the current pass is the last one.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.pass + 1 == self.n_passes
    }

    /// Returns the sum of final linear residuals over recorded passes.
    #[must_use]
    pub fn accumulated_residual(&self) -> f64 {
        self.residual
    }

    /// Returns `true` if every recorded linear solve converged.
    #[must_use]
    pub fn all_converged(&self) -> bool {
        self.all_converged
    }

    /// Records the linear solve of the current pass.
    pub(super) fn record(&mut self, report: &SolveReport) {
        self.phase = Phase::NonOrthoLoop;
        self.residual += report.final_residual;
        self.all_converged &= report.converged();
    }

    /// Moves to the next pass, returning `false` if the current one is final.
    pub(super) fn advance(&mut self) -> bool {
        if self.is_final() {
            return false;
        }
        self.pass += 1;
        true
    }

    pub(super) fn finalize(&mut self) {
        self.phase = Phase::Finalized;
    }

    /// Returns the status of a run that was not stopped early.
    pub(super) fn status(&self) -> Status {
        if self.all_converged {
            Status::Complete
        } else {
            Status::Unconverged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plenum_core::SolveStatus;

    fn report(status: SolveStatus, final_residual: f64) -> SolveReport {
        SolveReport {
            status,
            iters: 3,
            initial_residual: 1.0,
            final_residual,
        }
    }

    #[test]
    fn single_pass_is_final() {
        let mut state = CorrectionState::new(1);

        assert_eq!(state.phase(), Phase::PredictDone);
        assert!(state.is_final());
        assert!(!state.advance());
        assert_eq!(state.pass(), 0);
    }

    #[test]
    fn walks_through_passes() {
        let mut state = CorrectionState::new(3);
        let mut finals = Vec::new();

        loop {
            state.record(&report(SolveStatus::Converged, 0.5));
            finals.push(state.is_final());
            if !state.advance() {
                break;
            }
        }
        state.finalize();

        assert_eq!(finals, [false, false, true]);
        assert_eq!(state.pass(), 2);
        assert_eq!(state.phase(), Phase::Finalized);
        approx::assert_relative_eq!(state.accumulated_residual(), 1.5);
        assert_eq!(state.status(), Status::Complete);
    }

    #[test]
    fn any_unconverged_pass_marks_the_run() {
        let mut state = CorrectionState::new(2);
        state.record(&report(SolveStatus::MaxIters, 0.1));
        assert_eq!(state.phase(), Phase::NonOrthoLoop);
        state.advance();
        state.record(&report(SolveStatus::Converged, 0.0));

        assert!(!state.all_converged());
        assert_eq!(state.status(), Status::Unconverged);
    }
}
