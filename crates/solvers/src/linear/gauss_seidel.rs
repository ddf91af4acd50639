use plenum_core::{
    LinearSolver, LinearSolverError, LinearSystem, SolveReport, SolveStatus, SolverControls,
};

use super::{check_size, inverse_diagonal};

/// Forward Gauss-Seidel iteration.
///
/// Each iteration is one sweep over the rows in order, using updated values
/// as soon as they are available. Converges for diagonally dominant and for
/// symmetric positive definite matrices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GaussSeidel;

impl LinearSolver for GaussSeidel {
    fn name(&self) -> &str {
        "GaussSeidel"
    }

    fn solve(
        &self,
        system: &LinearSystem,
        x: &mut [f64],
        controls: &SolverControls,
    ) -> Result<SolveReport, LinearSolverError> {
        check_size(system, x)?;
        let inv_diag = inverse_diagonal(system)?;
        let matrix = system.matrix();
        let source = system.source();
        let normalization = system.normalization(x);

        let initial_residual = system.normalized_residual(x, normalization);
        let mut residual = initial_residual;
        if controls.is_converged(initial_residual, residual) {
            return Ok(SolveReport {
                status: SolveStatus::Converged,
                iters: 0,
                initial_residual,
                final_residual: residual,
            });
        }

        for iter in 1..=controls.max_iters() {
            for (row, inv) in inv_diag.iter().enumerate() {
                let off_diagonal: f64 = matrix
                    .row(row)
                    .filter(|&(col, _)| col != row)
                    .map(|(col, value)| value * x[col])
                    .sum();
                x[row] = (source[row] - off_diagonal) * inv;
            }

            residual = system.normalized_residual(x, normalization);
            if !residual.is_finite() {
                return Err(LinearSolverError::NonFinite { iter });
            }
            log::trace!("GaussSeidel sweep {iter}: residual = {residual:e}");

            if controls.is_converged(initial_residual, residual) {
                return Ok(SolveReport {
                    status: SolveStatus::Converged,
                    iters: iter,
                    initial_residual,
                    final_residual: residual,
                });
            }
        }

        Ok(SolveReport {
            status: SolveStatus::MaxIters,
            iters: controls.max_iters(),
            initial_residual,
            final_residual: residual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::test_systems::dirichlet_laplacian;
    use approx::assert_relative_eq;

    #[test]
    fn solves_laplacian() {
        let (system, exact) = dirichlet_laplacian(8);
        let mut x = vec![0.0; 8];
        let controls = SolverControls::new(1e-10, 0.0, 5000).unwrap();

        let report = GaussSeidel.solve(&system, &mut x, &controls).unwrap();

        assert!(report.converged());
        for (x, exact) in x.iter().zip(&exact) {
            assert_relative_eq!(x, exact, epsilon = 1e-7);
        }
    }

    #[test]
    fn residual_decreases_each_budget() {
        let (system, _) = dirichlet_laplacian(8);
        let strict = SolverControls::new(0.0, 0.0, 5).unwrap();

        let mut x = vec![0.0; 8];
        let first = GaussSeidel.solve(&system, &mut x, &strict).unwrap();
        let second = GaussSeidel.solve(&system, &mut x, &strict).unwrap();

        assert_eq!(first.status, SolveStatus::MaxIters);
        assert!(second.final_residual < first.final_residual);
    }
}
