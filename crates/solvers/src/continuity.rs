//! Continuity error diagnostics.

use std::fmt;

use plenum_core::{FaceField, Mesh};

use crate::discretize::divergence;

/// Volume-weighted measures of how far a flux field is from conservative.
///
/// For cell outflows `div_P` and time step `dt`:
///
/// - `sum_local = dt * Σ |div_P| / Σ V`
/// - `global = dt * Σ div_P / Σ V`
///
/// `cumulative` sums `global` over successive corrections; see
/// [`ContinuityErrors::accumulate`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContinuityErrors {
    pub sum_local: f64,
    pub global: f64,
    pub cumulative: f64,
}

impl ContinuityErrors {
    /// Measures the continuity errors of `flux`.
    ///
    /// The cumulative error starts at the global error.
    #[must_use]
    pub fn of(mesh: &Mesh, flux: &FaceField, dt: f64) -> Self {
        let div = divergence(mesh, flux);
        let volume = mesh.total_volume();
        let sum_local = dt * div.iter().map(|d| d.abs()).sum::<f64>() / volume;
        let global = dt * div.iter().sum::<f64>() / volume;
        Self {
            sum_local,
            global,
            cumulative: global,
        }
    }

    /// Returns these errors with the cumulative error of `previous` added.
    #[must_use]
    pub fn accumulate(self, previous: &Self) -> Self {
        Self {
            cumulative: previous.cumulative + self.global,
            ..self
        }
    }
}

impl fmt::Display for ContinuityErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "time step continuity errors : sum local = {:e}, global = {:e}, cumulative = {:e}",
            self.sum_local, self.global, self.cumulative
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn conservative_flux_has_no_error() {
        let mesh = Mesh::line(3, 1.0).unwrap();
        let flux = FaceField::new(&mesh, vec![1.0, 1.0, -1.0, 1.0]).unwrap();

        assert_eq!(ContinuityErrors::of(&mesh, &flux, 1.0), ContinuityErrors::default());
    }

    #[test]
    fn local_and_global_errors() {
        // Cell outflows are 1, -1, 2 over a total volume of 1.5.
        let mesh = Mesh::line(3, 0.5).unwrap();
        let flux = FaceField::new(&mesh, vec![1.0, 0.0, 0.0, 2.0]).unwrap();

        let errors = ContinuityErrors::of(&mesh, &flux, 0.1);

        assert_relative_eq!(errors.sum_local, 0.1 * 4.0 / 1.5);
        assert_relative_eq!(errors.global, 0.1 * 2.0 / 1.5);
        assert_relative_eq!(errors.cumulative, errors.global);
    }

    #[test]
    fn accumulates_global_error() {
        let first = ContinuityErrors {
            sum_local: 1.0,
            global: 0.5,
            cumulative: 0.5,
        };
        let second = ContinuityErrors {
            sum_local: 0.2,
            global: -0.1,
            cumulative: -0.1,
        };

        let total = second.accumulate(&first);

        assert_relative_eq!(total.cumulative, 0.4);
        assert_eq!(total.sum_local, 0.2);
    }

    #[test]
    fn display_matches_solver_log_format() {
        let errors = ContinuityErrors {
            sum_local: 1e-6,
            global: 0.0,
            cumulative: 0.0,
        };

        assert_eq!(
            errors.to_string(),
            "time step continuity errors : sum local = 1e-6, global = 0e0, cumulative = 0e0"
        );
    }
}
