//! Core traits and types for the Plenum pressure-velocity corrector.
//!
//! This crate defines the shared abstractions that operators, solvers, and
//! observers build on:
//!
//! - [`Mesh`] — an unstructured finite-volume mesh with face geometry queries
//! - [`CellField`], [`FaceField`] — per-cell and per-face storage with
//!   per-patch [`BoundaryCondition`]s
//! - [`Blend`] — the arithmetic a field element needs for interpolation and
//!   relaxation
//! - [`LinearSystem`] — a sparse matrix plus right-hand side, one row per cell
//! - [`LinearSolver`] — the seam through which pressure systems are solved
//! - [`Observer`] — receives solver events and optionally returns control actions
//! - [`kernels`] — BLAS-style vector kernels generic over real and complex scalars

mod blend;
mod field;
pub mod kernels;
mod linear;
mod mesh;
mod observer;
mod system;

pub use blend::Blend;
pub use field::{BoundaryCondition, CellField, FaceField, FieldError, ScalarField, VectorField};
pub use linear::{
    ControlsError, LinearSolver, LinearSolverError, SolveReport, SolveStatus, SolverControls,
};
pub use mesh::{Cell, Face, Mesh, MeshError, Patch};
pub use observer::Observer;
pub use system::{CsrBuilder, CsrMatrix, LinearSystem, SystemError};

/// Three-component vector used for positions, area vectors, and velocities.
pub type Vector = nalgebra::Vector3<f64>;
