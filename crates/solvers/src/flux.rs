//! Flux reconciliation.
//!
//! Given a provisional face flux `phi0`, the mobility `rAU` and a solved
//! pressure field `p`, the reconciled flux is
//!
//! ```text
//! phi = phi0 - rAU_f |S_f| ∂p/∂n
//! ```
//!
//! When the pressure solves `laplacian(rAU, p) == div(phi0)` assembled with the
//! same [`SnGradCoefficients`], the reconciled flux has zero net outflow from
//! every cell up to the linear solver tolerance.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use thiserror::Error;

use plenum_core::{FaceField, Mesh, ScalarField, Vector};

use crate::discretize::SnGradCoefficients;

/// Errors that can occur when reconciling a flux.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum FluxError {
    #[error("mobility must be positive and finite, found {value} in cell {cell}")]
    InvalidCoefficient { cell: usize, value: f64 },

    #[error("mobility must be positive and finite, found {value} on boundary face {face}")]
    InvalidBoundaryCoefficient { face: usize, value: f64 },

    #[error("{field} has {found} values, expected {expected}")]
    SizeMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Checks that a mobility field is strictly positive and finite everywhere,
/// including its boundary values.
///
/// # Errors
///
/// Returns the first offending cell or boundary face.
pub fn check_mobility(mesh: &Mesh, rau: &ScalarField) -> Result<(), FluxError> {
    let invalid = |value: f64| !value.is_finite() || value <= 0.0;

    if rau.len() != mesh.n_cells() {
        return Err(FluxError::SizeMismatch {
            field: "mobility",
            expected: mesh.n_cells(),
            found: rau.len(),
        });
    }
    if let Some((cell, &value)) = rau.values().iter().enumerate().find(|(_, v)| invalid(**v)) {
        return Err(FluxError::InvalidCoefficient { cell, value });
    }
    let offset = mesh.boundary_faces().start;
    if let Some((i, &value)) = rau
        .boundary_values()
        .iter()
        .enumerate()
        .find(|(_, v)| invalid(**v))
    {
        return Err(FluxError::InvalidBoundaryCoefficient {
            face: offset + i,
            value,
        });
    }
    Ok(())
}

/// Reconciles `phi0` with the pressure field `p`.
///
/// The explicit non-orthogonal correction uses `explicit_gradient` when
/// given. Inputs are not modified.
///
/// # Errors
///
/// Returns [`FluxError::InvalidCoefficient`] if the mobility is not strictly
/// positive and finite, or a size mismatch if a field does not match the mesh.
pub fn reconcile(
    mesh: &Mesh,
    phi0: &FaceField,
    rau: &ScalarField,
    p: &ScalarField,
    explicit_gradient: Option<&[Vector]>,
) -> Result<FaceField, FluxError> {
    check_mobility(mesh, rau)?;
    check_len("pressure", mesh.n_cells(), p.len())?;
    let coeffs = SnGradCoefficients::new(mesh, rau, p.conditions(), explicit_gradient);
    reconcile_with(mesh, phi0, &coeffs, p)
}

/// Reconciles `phi0` with `p` using precomputed face coefficients.
///
/// # Errors
///
/// Returns a size mismatch if a field does not match the mesh.
pub fn reconcile_with(
    mesh: &Mesh,
    phi0: &FaceField,
    coeffs: &SnGradCoefficients,
    p: &ScalarField,
) -> Result<FaceField, FluxError> {
    check_len("provisional flux", mesh.n_faces(), phi0.len())?;
    check_len("pressure", mesh.n_cells(), p.len())?;
    check_len("coefficients", mesh.n_faces(), coeffs.implicit().len())?;

    let mut phi = phi0.clone();
    correct_faces(mesh, coeffs, p, phi.values_mut());
    Ok(phi)
}

#[cfg(feature = "parallel")]
fn correct_faces(mesh: &Mesh, coeffs: &SnGradCoefficients, p: &ScalarField, phi: &mut [f64]) {
    phi.par_iter_mut()
        .enumerate()
        .for_each(|(face, phi)| *phi -= coeffs.flux(mesh, face, p));
}

#[cfg(not(feature = "parallel"))]
fn correct_faces(mesh: &Mesh, coeffs: &SnGradCoefficients, p: &ScalarField, phi: &mut [f64]) {
    for (face, phi) in phi.iter_mut().enumerate() {
        *phi -= coeffs.flux(mesh, face, p);
    }
}

fn check_len(field: &'static str, expected: usize, found: usize) -> Result<(), FluxError> {
    if expected == found {
        Ok(())
    } else {
        Err(FluxError::SizeMismatch {
            field,
            expected,
            found,
        })
    }
}
