use thiserror::Error;

use crate::LinearSystem;

/// Solves a sparse linear system in place.
///
/// Implementations start from the values already in `x` and overwrite them
/// with the solution. Failing to reach the tolerance within the iteration
/// budget is not an error; it is reported as [`SolveStatus::MaxIters`] so the
/// caller can decide how to proceed with the best-effort solution.
pub trait LinearSolver: Send + Sync {
    /// Returns the name this solver is registered under.
    fn name(&self) -> &str;

    /// Solves `A x = b`, updating `x` in place.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` has the wrong length or the iteration breaks
    /// down (zero diagonal, loss of positive definiteness, non-finite values).
    fn solve(
        &self,
        system: &LinearSystem,
        x: &mut [f64],
        controls: &SolverControls,
    ) -> Result<SolveReport, LinearSolverError>;
}

/// Errors raised by a linear solver.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum LinearSolverError {
    #[error("solution vector has {found} entries, expected {expected}")]
    SizeMismatch { expected: usize, found: usize },

    #[error("zero diagonal in row {row}")]
    ZeroDiagonal { row: usize },

    #[error("breakdown at iteration {iter}: search direction has non-positive curvature {curvature}")]
    Breakdown { iter: usize, curvature: f64 },

    #[error("residual became non-finite at iteration {iter}")]
    NonFinite { iter: usize },
}

/// Errors that can occur when validating solver controls.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ControlsError {
    #[error("tolerance must be finite and non-negative")]
    Tolerance,

    #[error("rel_tol must be finite and non-negative")]
    RelTol,

    #[error("max_iters must be at least 1")]
    MaxIters,
}

/// Convergence controls for a linear solve.
///
/// A solve has converged when the normalized residual
/// `‖b - A x‖ / (‖b‖ + ‖A x0‖)` is at most `tolerance`, or, when `rel_tol` is
/// positive, at most `rel_tol` times the initial normalized residual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverControls {
    tolerance: f64,
    rel_tol: f64,
    max_iters: usize,
}

impl Default for SolverControls {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1e-6, 0.0, 1000).unwrap()
    }
}

impl SolverControls {
    /// Creates validated solver controls.
    ///
    /// # Errors
    ///
    /// Returns an error if a tolerance is negative or non-finite, or if
    /// `max_iters` is zero.
    pub fn new(tolerance: f64, rel_tol: f64, max_iters: usize) -> Result<Self, ControlsError> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ControlsError::Tolerance);
        }
        if !rel_tol.is_finite() || rel_tol < 0.0 {
            return Err(ControlsError::RelTol);
        }
        if max_iters == 0 {
            return Err(ControlsError::MaxIters);
        }

        Ok(Self {
            tolerance,
            rel_tol,
            max_iters,
        })
    }

    /// Returns these controls with the relative tolerance disabled.
    #[must_use]
    pub fn without_rel_tol(self) -> Self {
        Self {
            rel_tol: 0.0,
            ..self
        }
    }

    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[must_use]
    pub fn rel_tol(&self) -> f64 {
        self.rel_tol
    }

    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// Returns `true` if `residual` meets the convergence criteria given the
    /// `initial` residual of the solve.
    #[must_use]
    pub fn is_converged(&self, initial: f64, residual: f64) -> bool {
        residual <= self.tolerance || (self.rel_tol > 0.0 && residual <= self.rel_tol * initial)
    }
}

/// How a linear solve terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// The residual met the convergence criteria.
    Converged,

    /// The iteration budget ran out first.
    MaxIters,
}

/// Outcome of a linear solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    pub status: SolveStatus,
    pub iters: usize,
    pub initial_residual: f64,
    pub final_residual: f64,
}

impl SolveReport {
    #[must_use]
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}
