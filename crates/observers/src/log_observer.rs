use log::Level;

use plenum_core::Observer;
use plenum_solvers::pressure::{Action, Event};

/// An observer that reports corrector progress through the `log` facade.
///
/// Each solved pass is logged as
///
/// ```text
/// PCG: Solving for p, Initial residual = 1e-2, Final residual = 3e-7, No Iterations 12
/// ```
///
/// and the finalized event logs the continuity errors. Never returns an
/// action.
///
/// # Example
///
/// ```ignore
/// let solution = pressure::solve(&ctx, predicted, &rau, LogObserver::default())?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogObserver {
    level: Level,
}

impl LogObserver {
    /// Creates an observer that logs at `level`.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl Observer<Event<'_>, Action> for LogObserver {
    fn observe(&mut self, event: &Event<'_>) -> Option<Action> {
        if log::log_enabled!(self.level) {
            log::log!(self.level, "{}", message(event));
        }
        None
    }
}

/// Formats the log line for an event.
fn message(event: &Event<'_>) -> String {
    match event {
        Event::Solved { solver, report, .. } => format!(
            "{solver}: Solving for p, Initial residual = {:e}, Final residual = {:e}, No Iterations {}",
            report.initial_residual, report.final_residual, report.iters,
        ),
        Event::Finalized { continuity, .. } => continuity.to_string(),
    }
}
