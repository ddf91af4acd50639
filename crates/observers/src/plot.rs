//! Residual plot for the pressure corrector.
//!
//! See [`ResidualPlot`] for usage.

use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use plenum_core::{Observer, SolveReport};
use plenum_solvers::{
    continuity::ContinuityErrors,
    pressure::{Action, Event},
};

/// Configuration for rendering a [`ResidualPlot`].
///
/// Residual plots default to a legend and a logarithmic y-axis.
///
/// # Example
///
/// ```ignore
/// plot.show(ShowConfig::new().title("Closed box"))?;
/// ```
pub struct ShowConfig {
    title: Option<String>,
    legend: bool,
    log_y: bool,
}

impl ShowConfig {
    /// Creates a `ShowConfig` with no title, a legend, and a log scale.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: None,
            legend: true,
            log_y: true,
        }
    }

    /// Sets the window title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Hides the legend.
    #[must_use]
    pub fn without_legend(mut self) -> Self {
        self.legend = false;
        self
    }

    /// Plots raw values instead of their base-10 logarithm.
    #[must_use]
    pub fn linear_y(mut self) -> Self {
        self.log_y = false;
        self
    }
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// An observer that collects residual histories across corrector runs and
/// displays them via egui.
///
/// The x-axis counts linear solves, so repeated runs of the corrector (one
/// per outer iteration) append to the same history. Three traces are kept:
///
/// - the initial residual of each pass
/// - the final residual of each pass
/// - the local continuity error of each finished run, at its last solve
///
/// Pass `&mut ResidualPlot` as the observer so it can be shown afterwards.
///
/// # Example
///
/// ```ignore
/// let mut plot = ResidualPlot::new();
/// for _ in 0..outer_iterations {
///     let solution = pressure::solve(&ctx, predicted, &rau, &mut plot)?;
///     // ...feed the solution into the next momentum prediction...
/// }
/// plot.show(ShowConfig::new().title("Pressure residuals"))?;
/// ```
#[derive(Debug, Default)]
pub struct ResidualPlot {
    solves: usize,
    initial: Vec<[f64; 2]>,
    last: Vec<[f64; 2]>,
    continuity: Vec<[f64; 2]>,
}

impl ResidualPlot {
    /// Creates an empty plot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of linear solves recorded.
    #[must_use]
    pub fn solves(&self) -> usize {
        self.solves
    }

    /// Records the outcome of one linear solve.
    pub fn record_solve(&mut self, report: &SolveReport) {
        self.solves += 1;
        let x = self.solves as f64;
        self.initial.push([x, report.initial_residual]);
        self.last.push([x, report.final_residual]);
    }

    /// Records the continuity errors of a finished run at the latest solve.
    pub fn record_continuity(&mut self, errors: &ContinuityErrors) {
        self.continuity.push([self.solves as f64, errors.sum_local]);
    }

    /// Opens a blocking egui window displaying the collected histories.
    ///
    /// Blocks until the window is closed by the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the native window cannot be created.
    pub fn show(self, config: ShowConfig) -> Result<(), eframe::Error> {
        let options = eframe::NativeOptions::default();
        let title = config.title.unwrap_or_else(|| "Pressure residuals".to_owned());
        let app = ResidualApp {
            lines: vec![
                ("Initial residual".to_owned(), self.initial),
                ("Final residual".to_owned(), self.last),
            ],
            continuity: self.continuity,
            legend: config.legend,
            log_y: config.log_y,
        };

        eframe::run_native(&title, options, Box::new(move |_cc| Ok(Box::new(app))))
    }
}

impl Observer<Event<'_>, Action> for ResidualPlot {
    fn observe(&mut self, event: &Event<'_>) -> Option<Action> {
        match event {
            Event::Solved { report, .. } => self.record_solve(report),
            Event::Finalized { continuity, .. } => self.record_continuity(continuity),
        }
        None
    }
}

/// Allows `&mut ResidualPlot` to be passed to the corrector, which takes its
/// observer by value, so [`ResidualPlot::show`] can be called afterwards.
impl Observer<Event<'_>, Action> for &mut ResidualPlot {
    fn observe(&mut self, event: &Event<'_>) -> Option<Action> {
        (**self).observe(event)
    }
}

/// The egui [`eframe::App`] that renders collected histories.
struct ResidualApp {
    lines: Vec<(String, Vec<[f64; 2]>)>,
    continuity: Vec<[f64; 2]>,
    legend: bool,
    log_y: bool,
}

impl ResidualApp {
    fn points(&self, points: &[[f64; 2]]) -> PlotPoints {
        if self.log_y {
            points
                .iter()
                .filter(|p| p[1] > 0.0)
                .map(|p| [p[0], p[1].log10()])
                .collect()
        } else {
            points.iter().copied().collect()
        }
    }
}

impl eframe::App for ResidualApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let mut plot = Plot::new("residual_plot").x_axis_label("Linear solve");
            if self.legend {
                plot = plot.legend(Legend::default());
            }
            if self.log_y {
                plot = plot.y_axis_label("log₁₀");
            }
            plot.show(ui, |plot_ui| {
                for (name, points) in &self.lines {
                    plot_ui.line(Line::new(self.points(points)).name(name));
                }
                plot_ui.points(
                    Points::new(self.points(&self.continuity))
                        .radius(3.0)
                        .name("Continuity (sum local)"),
                );
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plenum_core::SolveStatus;

    fn report(initial: f64, last: f64) -> SolveReport {
        SolveReport {
            status: SolveStatus::Converged,
            iters: 4,
            initial_residual: initial,
            final_residual: last,
        }
    }

    #[test]
    fn solves_are_numbered_across_runs() {
        let mut plot = ResidualPlot::new();
        plot.record_solve(&report(1.0, 1e-3));
        plot.record_solve(&report(1e-2, 1e-6));
        plot.record_continuity(&ContinuityErrors {
            sum_local: 1e-8,
            global: 0.0,
            cumulative: 0.0,
        });
        plot.record_solve(&report(1e-3, 1e-7));

        assert_eq!(plot.solves(), 3);
        assert_eq!(plot.initial, [[1.0, 1.0], [2.0, 1e-2], [3.0, 1e-3]]);
        assert_eq!(plot.last, [[1.0, 1e-3], [2.0, 1e-6], [3.0, 1e-7]]);
        assert_eq!(plot.continuity, [[2.0, 1e-8]]);
    }

    #[test]
    fn log_scale_skips_non_positive_values() {
        let app = ResidualApp {
            lines: Vec::new(),
            continuity: Vec::new(),
            legend: true,
            log_y: true,
        };
        let points = app.points(&[[1.0, 100.0], [2.0, 0.0], [3.0, 1e-3]]);

        let ys: Vec<f64> = points.points().iter().map(|p| p.y).collect();
        assert_eq!(ys.len(), 2);
        approx::assert_relative_eq!(ys[0], 2.0, epsilon = 1e-12);
        approx::assert_relative_eq!(ys[1], -3.0, epsilon = 1e-12);
    }

    #[test]
    fn records_successive_corrector_runs() {
        use plenum_core::{
            BoundaryCondition::{FixedValue, ZeroGradient},
            FaceField, Mesh, ScalarField, Vector, VectorField,
        };
        use plenum_solvers::{
            linear::Registry,
            pressure::{self, Config, Context, Predicted, Status},
        };

        let mesh = Mesh::line(3, 1.0).unwrap();
        let rau = ScalarField::uniform(&mesh, 1.0, vec![ZeroGradient; 2]).unwrap();
        let flux = FaceField::new(&mesh, vec![0.4, 0.2, -0.5, 0.3]).unwrap();
        let mut pressure =
            ScalarField::uniform(&mesh, 0.0, vec![ZeroGradient, FixedValue(0.0)]).unwrap();
        let velocity = VectorField::uniform(&mesh, Vector::zeros(), vec![ZeroGradient; 2]).unwrap();
        let ctx = Context::new(mesh, Config::new(1, 0.5).unwrap(), &Registry::with_defaults())
            .unwrap();

        let mut plot = ResidualPlot::new();
        for _ in 0..2 {
            let predicted = Predicted {
                velocity: velocity.clone(),
                flux: flux.clone(),
                pressure,
            };
            let solution = pressure::solve(&ctx, predicted, &rau, &mut plot).unwrap();
            assert_eq!(solution.status, Status::Complete);
            pressure = solution.pressure;
        }

        assert_eq!(plot.solves(), 4);
        let at: Vec<f64> = plot.continuity.iter().map(|p| p[0]).collect();
        assert_eq!(at, [2.0, 4.0]);
    }
}
