use plenum_core::{
    LinearSolver, LinearSolverError, LinearSystem, SolveReport, SolveStatus, SolverControls,
    kernels::{axpy, dot, norm2, xpby},
};

use super::{check_size, inverse_diagonal};

/// Conjugate gradient with a Jacobi (diagonal) preconditioner.
///
/// Requires a symmetric positive definite matrix. The pressure equation
/// assembled by [`crate::discretize::laplacian`] is symmetric positive
/// semi-definite, and definite once a boundary fixes the pressure level or a
/// reference cell is pinned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pcg;

impl LinearSolver for Pcg {
    fn name(&self) -> &str {
        "PCG"
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
        let normalization = system.normalization(x);

        let mut r = system.residual(x);
        let initial_residual = norm2(&r) / normalization;
        let mut residual = initial_residual;
        if controls.is_converged(initial_residual, residual) {
            return Ok(SolveReport {
                status: SolveStatus::Converged,
                iters: 0,
                initial_residual,
                final_residual: residual,
            });
        }

        let mut z: Vec<f64> = r.iter().zip(&inv_diag).map(|(r, d)| r * d).collect();
        let mut p = z.clone();
        let mut ap = vec![0.0; x.len()];
        let mut rz = dot(&r, &z);

        for iter in 1..=controls.max_iters() {
            matrix.mul_vec(&p, &mut ap);
            let curvature = dot(&p, &ap);
            if !curvature.is_finite() || curvature <= 0.0 {
                return Err(LinearSolverError::Breakdown { iter, curvature });
            }

            let alpha = rz / curvature;
            axpy(alpha, &p, x);
            axpy(-alpha, &ap, &mut r);

            residual = norm2(&r) / normalization;
            if !residual.is_finite() {
                return Err(LinearSolverError::NonFinite { iter });
            }
            log::trace!("PCG iteration {iter}: residual = {residual:e}");

            if controls.is_converged(initial_residual, residual) {
                return Ok(SolveReport {
                    status: SolveStatus::Converged,
                    iters: iter,
                    initial_residual,
                    final_residual: residual,
                });
            }

            for ((z, r), d) in z.iter_mut().zip(&r).zip(&inv_diag) {
                *z = r * d;
            }
            let rz_next = dot(&r, &z);
            xpby(&z, rz_next / rz, &mut p);
            rz = rz_next;
        }

        Ok(SolveReport {
            status: SolveStatus::MaxIters,
            iters: controls.max_iters(),
            initial_residual,
            final_residual: residual,
        })
    }
}
