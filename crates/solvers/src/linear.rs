//! Reference iterative linear solvers.
//!
//! Solvers are selected by name through a [`Registry`], which maps names to
//! factories producing boxed [`LinearSolver`] trait objects. The default
//! registry provides:
//!
//! - `"PCG"` — [`Pcg`], Jacobi-preconditioned conjugate gradient for
//!   symmetric positive definite systems such as the pressure equation
//! - `"GaussSeidel"` — [`GaussSeidel`], forward Gauss-Seidel sweeps
//!
//! [`LinearSolver`]: plenum_core::LinearSolver

mod gauss_seidel;
mod pcg;
mod registry;

pub use gauss_seidel::GaussSeidel;
pub use pcg::Pcg;
pub use registry::{Factory, Registry, RegistryError};

use plenum_core::{LinearSolverError, LinearSystem};

/// Returns the inverse diagonal of a system, rejecting zero diagonals.
fn inverse_diagonal(system: &LinearSystem) -> Result<Vec<f64>, LinearSolverError> {
    system
        .matrix()
        .diagonal()
        .into_iter()
        .enumerate()
        .map(|(row, d)| {
            if d == 0.0 || !d.is_finite() {
                Err(LinearSolverError::ZeroDiagonal { row })
            } else {
                Ok(1.0 / d)
            }
        })
        .collect()
}

fn check_size(system: &LinearSystem, x: &[f64]) -> Result<(), LinearSolverError> {
    if x.len() == system.n_rows() {
        Ok(())
    } else {
        Err(LinearSolverError::SizeMismatch {
            expected: system.n_rows(),
            found: x.len(),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_systems {
    use plenum_core::{CsrBuilder, LinearSystem};

    /// The `n` by `n` 1-D Laplacian with Dirichlet ends, `tridiag(-1, 2, -1)`,
    /// and a source chosen so the solution is `x_i = i + 1`.
    pub fn dirichlet_laplacian(n: usize) -> (LinearSystem, Vec<f64>) {
        let mut builder = CsrBuilder::new(n);
        for row in 0..n {
            builder.add(row, row, 2.0);
            if row + 1 < n {
                builder.add(row, row + 1, -1.0);
                builder.add(row + 1, row, -1.0);
            }
        }
        let matrix = builder.build();
        let exact: Vec<f64> = (1..=n).map(|i| i as f64).collect();
        let mut source = vec![0.0; n];
        matrix.mul_vec(&exact, &mut source);
        (LinearSystem::new(matrix, source).unwrap(), exact)
    }
}
