//! Pressure-velocity coupling corrector.
//!
//! Given a provisional velocity `U0` and face flux `phi0` from a momentum
//! predictor, and the mobility `rAU` (the inverse momentum diagonal), the
//! corrector solves
//!
//! ```text
//! ∇·(rAU ∇p) = ∇·phi0
//! ```
//!
//! one or more times, reconciles the flux so it is conservative, then relaxes
//! pressure and corrects the velocity:
//!
//! ```text
//! phi = phi0 - rAU_f |S_f| ∂p/∂n
//! U   = U0 - rAU ∇p
//! ```
//!
//! Extra passes re-evaluate the explicit non-orthogonal correction from the
//! latest pressure. On an orthogonal mesh they reproduce the first pass.
//!
//! # Example
//!
//! ```ignore
//! use plenum_solvers::{linear::Registry, pressure};
//!
//! let config = pressure::Config::from_toml_str(toml)?;
//! let ctx = pressure::Context::new(mesh, config, &Registry::with_defaults())?;
//!
//! let predicted = pressure::Predicted { velocity, flux, pressure };
//! let solution = pressure::solve_unobserved(&ctx, predicted, &rau)?;
//!
//! println!("{}", solution.continuity.unwrap_or_default());
//! ```

mod action;
mod config;
mod context;
mod error;
mod event;
mod solution;
mod state;

pub use action::Action;
pub use config::{Config, ConfigError, SolverSettings};
pub use context::{Context, ContextError};
pub use error::Error;
pub use event::Event;
pub use solution::{PassReport, Solution, Status};
pub use state::{CorrectionState, Phase};

use plenum_core::{FaceField, FieldError, Mesh, Observer, ScalarField, VectorField};

use crate::{
    continuity::ContinuityErrors,
    discretize::{SnGradCoefficients, divergence, gradient, laplacian},
    flux::{check_mobility, reconcile_with},
    reference::Pinning,
    relaxation::relax,
};

/// Fields produced by the momentum predictor.
///
/// Moved into [`solve`] and returned, corrected, in the [`Solution`].
#[derive(Debug, Clone)]
pub struct Predicted {
    /// Provisional velocity `U0`.
    pub velocity: VectorField,
    /// Provisional face flux `phi0`.
    pub flux: FaceField,
    /// Pressure from the previous iteration, used as the initial guess and as
    /// the base for relaxation.
    pub pressure: ScalarField,
}

impl Predicted {
    fn check(&self, mesh: &Mesh) -> Result<(), Error> {
        check_len("velocity", mesh.n_cells(), self.velocity.len())?;
        check_len("pressure", mesh.n_cells(), self.pressure.len())?;
        check_len("flux", mesh.n_faces(), self.flux.len())?;
        check_patches("velocity", mesh, self.velocity.conditions().len())?;
        check_patches("pressure", mesh, self.pressure.conditions().len())
    }
}

/// Corrects pressure, flux, and velocity for one outer iteration.
///
/// # Algorithm
///
/// 1. Check field sizes and that `rau` is strictly positive.
/// 2. Decide whether pressure must be pinned to the reference cell.
/// 3. For each pass:
///    - Build face coefficients from `rau`, with the explicit non-orthogonal
///      correction taken from the gradient of the current pressure.
///    - Assemble the pressure equation and pin it if needed.
///    - Solve it, using the final-pass solver on the last pass.
///    - Shift pressure onto the reference value and reconcile the flux.
///    - Emit [`Event::Solved`]. If the observer returns `StopEarly`, return.
/// 4. Measure continuity errors, relax pressure against its incoming value,
///    correct the velocity, and emit [`Event::Finalized`].
///
/// A linear solve that runs out of iterations is logged and reported through
/// [`Status::Unconverged`]; the remaining passes still run.
///
/// # Errors
///
/// Returns an error if a field does not match the mesh, the mobility is not
/// strictly positive and finite, pressure needs a reference that is not
/// configured, or a linear solver breaks down.
pub fn solve<Obs>(
    ctx: &Context,
    predicted: Predicted,
    rau: &ScalarField,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let mesh = ctx.mesh();
    let config = ctx.config();

    predicted.check(mesh)?;
    check_mobility(mesh, rau)?;

    let Predicted {
        velocity,
        flux: phi0,
        mut pressure,
    } = predicted;

    let pinning = Pinning::new(mesh, pressure.conditions(), config.reference())?;
    let previous = pressure.values().to_vec();
    let div0 = divergence(mesh, &phi0);

    let final_settings = config.final_solver();
    let mut state = CorrectionState::new(config.n_passes());
    let mut passes = Vec::with_capacity(state.n_passes());

    let flux = loop {
        let (solver, controls) = if state.is_final() {
            (ctx.final_solver(), final_settings.controls())
        } else {
            (ctx.solver(), config.solver().controls())
        };

        let grad = gradient(mesh, &pressure);
        let coeffs = SnGradCoefficients::new(mesh, rau, pressure.conditions(), Some(&grad));
        let mut system = laplacian(mesh, &coeffs, &pressure);
        for (cell, div) in div0.iter().enumerate() {
            system.add_source(cell, -div);
        }
        pinning.constrain(&mut system);

        let report = solver
            .solve(&system, pressure.values_mut(), &controls)
            .map_err(|source| Error::LinearSolver {
                pass: state.pass(),
                source,
            })?;
        pressure.correct_boundary_conditions(mesh);
        pressure = pinning.level(mesh, pressure);

        log::debug!(
            "{}: Solving for p, Initial residual = {:e}, Final residual = {:e}, No Iterations {}",
            solver.name(),
            report.initial_residual,
            report.final_residual,
            report.iters,
        );
        if !report.converged() {
            log::warn!(
                "pressure pass {} did not converge in {} iterations (residual {:e})",
                state.pass(),
                report.iters,
                report.final_residual,
            );
        }

        let flux = reconcile_with(mesh, &phi0, &coeffs, &pressure)?;
        state.record(&report);
        passes.push(PassReport {
            pass: state.pass(),
            is_final: state.is_final(),
            solver: solver.name().to_owned(),
            report,
        });

        let event = Event::Solved {
            state: &state,
            solver: solver.name(),
            report: &report,
            pressure: &pressure,
            flux: &flux,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution {
                status: Status::StoppedByObserver,
                velocity,
                flux,
                pressure,
                passes,
                continuity: None,
            });
        }

        if !state.advance() {
            break flux;
        }
    };

    state.finalize();
    let continuity = ContinuityErrors::of(mesh, &flux, config.time_step());

    let relaxed = relax(&previous, pressure.values(), config.pressure_relaxation());
    pressure.values_mut().copy_from_slice(&relaxed);
    pressure.correct_boundary_conditions(mesh);
    let pressure = pinning.level(mesh, pressure);

    let velocity = correct_velocity(mesh, velocity, rau, &pressure);

    let event = Event::Finalized {
        state: &state,
        continuity: &continuity,
        pressure: &pressure,
        velocity: &velocity,
    };
    // Too late to stop; the fields are already final.
    let _ = observer.observe(&event);

    Ok(Solution {
        status: state.status(),
        velocity,
        flux,
        pressure,
        passes,
        continuity: Some(continuity),
    })
}

/// Corrects pressure, flux, and velocity without observation.
///
/// This is a convenience wrapper around [`solve`] that discards events.
///
/// # Errors
///
/// See [`solve`].
pub fn solve_unobserved(
    ctx: &Context,
    predicted: Predicted,
    rau: &ScalarField,
) -> Result<Solution, Error> {
    solve(ctx, predicted, rau, ())
}

/// Returns `U0 - rAU ∇p` with re-evaluated boundary values.
fn correct_velocity(
    mesh: &Mesh,
    mut velocity: VectorField,
    rau: &ScalarField,
    pressure: &ScalarField,
) -> VectorField {
    let grad = gradient(mesh, pressure);
    for ((u, rau), grad) in velocity.values_mut().iter_mut().zip(rau.values()).zip(&grad) {
        *u -= grad * *rau;
    }
    velocity.correct_boundary_conditions(mesh);
    velocity
}

fn check_len(field: &'static str, expected: usize, found: usize) -> Result<(), Error> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::SizeMismatch {
            field,
            expected,
            found,
        })
    }
}

fn check_patches(field: &'static str, mesh: &Mesh, found: usize) -> Result<(), Error> {
    let expected = mesh.patches().len();
    if expected == found {
        Ok(())
    } else {
        Err(Error::Field {
            field,
            source: FieldError::PatchCount { expected, found },
        })
    }
}
