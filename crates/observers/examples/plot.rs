//! Interactive residual plots of the pressure corrector.
//!
//! Each mode runs a series of outer iterations on a small channel and opens a
//! plot window showing the pressure residuals and continuity errors.
//!
//! # Usage
//!
//! ```text
//! cargo run --example plot --features plot -- channel
//! cargo run --example plot --features plot -- skewed
//! cargo run --example plot --features plot -- skewed 0.7
//! ```
//!
//! # Modes
//!
//! - **channel**: an orthogonal 20x8 channel with a fixed-pressure outlet.
//!   Each outer iteration relaxes pressure by 0.3, so the initial residual of
//!   every pass falls geometrically.
//!
//! - **skewed [shear]**: the same channel sheared by `shear` (default 0.4)
//!   with two non-orthogonal correctors. The extra passes start from much
//!   smaller residuals than the first.

use std::error::Error;

use plenum_core::{
    BoundaryCondition::{FixedValue, ZeroGradient},
    Cell, Face, Mesh, Observer, Patch, ScalarField, Vector, VectorField,
};
use plenum_observers::{LogObserver, ResidualPlot, ShowConfig};
use plenum_solvers::{
    discretize::face_flux,
    linear::Registry,
    pressure::{self, Config, Context, Event, Predicted},
};

const OUTER_ITERATIONS: usize = 25;

fn main() -> Result<(), Box<dyn Error>> {
    let mode = std::env::args().nth(1).unwrap_or_else(|| "channel".into());
    match mode.as_str() {
        "channel" => run(Mesh::rectangle(20, 8, 0.05, 0.05)?, 0, "Orthogonal channel"),
        "skewed" => {
            let shear = std::env::args()
                .nth(2)
                .as_deref()
                .map(str::parse::<f64>)
                .transpose()
                .unwrap_or_else(|_| {
                    eprintln!("Invalid shear, expected a number, e.g. 0.4");
                    std::process::exit(1);
                })
                .unwrap_or(0.4);
            run(sheared(20, 8, 0.05, shear)?, 2, "Skewed channel")
        }
        other => {
            eprintln!("Unknown mode: {other}");
            eprintln!("Usage: plot [channel|skewed [shear]]");
            std::process::exit(1);
        }
    }
}

/// Runs outer iterations with a toy momentum predictor and plots residuals.
fn run(mesh: Mesh, n_non_orth: usize, title: &str) -> Result<(), Box<dyn Error>> {
    let walls = Vector::zeros();
    let velocity_conditions = vec![
        FixedValue(Vector::new(1.0, 0.0, 0.0)),
        ZeroGradient,
        FixedValue(walls),
        FixedValue(walls),
    ];
    let pressure_conditions = vec![ZeroGradient, FixedValue(0.0), ZeroGradient, ZeroGradient];

    let mut velocity = VectorField::uniform(&mesh, Vector::zeros(), velocity_conditions)?;
    let mut pressure = ScalarField::uniform(&mesh, 0.0, pressure_conditions)?;
    let rau = ScalarField::uniform(&mesh, 0.02, vec![ZeroGradient; 4])?;

    let config = Config::new(n_non_orth, 0.3)?.with_time_step(0.01)?;
    let ctx = Context::new(mesh, config, &Registry::with_defaults())?;

    let mut plot = ResidualPlot::new();
    let mut log = LogObserver::default();
    for _ in 0..OUTER_ITERATIONS {
        let predicted = predict(ctx.mesh(), &velocity, pressure);
        let solution = pressure::solve(&ctx, predicted, &rau, |event: &Event<'_>| {
            log.observe(event);
            plot.observe(event)
        })?;
        velocity = solution.velocity;
        pressure = solution.pressure;
    }

    plot.show(ShowConfig::new().title(format!("{title}: pressure residuals")))?;
    Ok(())
}

/// A stand-in momentum predictor: nudges velocity toward plug flow with a
/// swirl, then interpolates it to faces.
fn predict(mesh: &Mesh, velocity: &VectorField, pressure: ScalarField) -> Predicted {
    let mut predicted = velocity.clone();
    for (u, cell) in predicted.values_mut().iter_mut().zip(mesh.cells()) {
        let target = Vector::new(1.0, 0.3 * (20.0 * cell.centre.x).sin(), 0.0);
        *u += 0.5 * (target - *u);
    }
    predicted.correct_boundary_conditions(mesh);

    Predicted {
        flux: face_flux(mesh, &predicted),
        velocity: predicted,
        pressure,
    }
}

/// Builds a rectangle of square cells sheared so `x' = x + shear * y`.
fn sheared(nx: usize, ny: usize, h: f64, shear: f64) -> Result<Mesh, Box<dyn Error>> {
    let base = Mesh::rectangle(nx, ny, h, h)?;
    let map = |v: Vector| Vector::new(v.x + shear * v.y, v.y, v.z);

    let cells = base
        .cells()
        .iter()
        .map(|c| Cell {
            centre: map(c.centre),
            volume: c.volume,
        })
        .collect();
    let faces = base
        .faces()
        .iter()
        .map(|f| Face {
            centre: map(f.centre),
            area: Vector::new(f.area.x, f.area.y - shear * f.area.x, f.area.z),
            ..*f
        })
        .collect();
    let patches = base
        .patches()
        .iter()
        .map(|p| Patch::new(p.name(), p.start(), p.size()))
        .collect();

    Ok(Mesh::new(cells, faces, patches)?)
}
