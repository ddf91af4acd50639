use thiserror::Error;

use plenum_core::{FieldError, LinearSolverError};

use crate::{flux::FluxError, reference::ReferenceError};

/// Errors that abort a pressure correction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
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

    #[error("{field} does not match the mesh: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: FieldError,
    },

    #[error("cannot pin pressure: {0}")]
    Reference(#[from] ReferenceError),

    #[error("linear solver failed on pass {pass}")]
    LinearSolver {
        pass: usize,
        #[source]
        source: LinearSolverError,
    },
}

impl From<FluxError> for Error {
    fn from(err: FluxError) -> Self {
        match err {
            FluxError::InvalidCoefficient { cell, value } => {
                Self::InvalidCoefficient { cell, value }
            }
            FluxError::InvalidBoundaryCoefficient { face, value } => {
                Self::InvalidBoundaryCoefficient { face, value }
            }
            FluxError::SizeMismatch {
                field,
                expected,
                found,
            } => Self::SizeMismatch {
                field,
                expected,
                found,
            },
        }
    }
}
