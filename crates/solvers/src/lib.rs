//! Pressure-velocity coupling for incompressible finite-volume solvers.
//!
//! The centrepiece is [`pressure::solve`], which takes the provisional
//! velocity and face flux from a momentum predictor and returns a
//! mass-conservative flux, a corrected velocity, and the pressure field.
//! It is built from the smaller pieces in this crate:
//!
//! - [`discretize`] — face interpolation, Gauss gradient, divergence, and the
//!   Laplacian assembled into a [`LinearSystem`]
//! - [`flux`] — the flux reconciler, `phi = phi0 - rAU_f * snGrad(p)`
//! - [`relaxation`] — explicit and implicit under-relaxation
//! - [`reference`] — pinning the pressure level when no boundary fixes it
//! - [`continuity`] — continuity error diagnostics
//! - [`linear`] — reference iterative solvers and a name-based registry
//!
//! [`LinearSystem`]: plenum_core::LinearSystem

pub mod continuity;
pub mod discretize;
pub mod flux;
pub mod linear;
pub mod pressure;
pub mod reference;
pub mod relaxation;
