//! Reference pressure pinning.
//!
//! When no boundary prescribes an absolute pressure, the pressure equation
//! only determines pressure up to a constant. Pinning removes that freedom by
//! softly fixing one cell: its row in the assembled system gets its own
//! diagonal added again, with a matching source, and the solved field is then
//! shifted so the reference cell holds the reference value exactly.

use serde::Deserialize;
use thiserror::Error;

use plenum_core::{BoundaryCondition, LinearSystem, Mesh, ScalarField};

/// The cell whose pressure is fixed, and the value it is fixed to.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceCell {
    pub cell: usize,
    #[serde(default)]
    pub value: f64,
}

impl ReferenceCell {
    #[must_use]
    pub fn new(cell: usize, value: f64) -> Self {
        Self { cell, value }
    }
}

/// Errors that can occur when deciding how to pin a pressure field.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ReferenceError {
    #[error("pressure level is undetermined and no reference cell is configured")]
    Missing,

    #[error("reference cell {cell} is out of range for a mesh with {n_cells} cells")]
    CellOutOfRange { cell: usize, n_cells: usize },

    #[error("reference value must be finite, found {0}")]
    NonFiniteValue(f64),
}

/// Returns `true` if no pressure boundary condition fixes the pressure level.
///
/// Zero-gradient and coupled patches leave the level free, so a mesh whose
/// patches are all of those kinds (or that has no patches) needs a reference.
#[must_use]
pub fn needs_reference(conditions: &[BoundaryCondition<f64>]) -> bool {
    !conditions.iter().any(BoundaryCondition::fixes_level)
}

/// How the pressure level is determined for a given set of conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pinning {
    /// A boundary fixes the level; pinning is a no-op.
    NotNeeded,

    /// The level is fixed at a reference cell.
    Pinned(ReferenceCell),
}

impl Pinning {
    /// Decides whether pinning is needed for pressure `conditions`.
    ///
    /// The reference is only consulted, and only validated, when needed.
    ///
    /// # Errors
    ///
    /// Returns an error if a reference is needed but missing, names a cell
    /// outside the mesh, or has a non-finite value.
    pub fn new(
        mesh: &Mesh,
        conditions: &[BoundaryCondition<f64>],
        reference: Option<ReferenceCell>,
    ) -> Result<Self, ReferenceError> {
        if !needs_reference(conditions) {
            return Ok(Self::NotNeeded);
        }
        let reference = reference.ok_or(ReferenceError::Missing)?;
        if reference.cell >= mesh.n_cells() {
            return Err(ReferenceError::CellOutOfRange {
                cell: reference.cell,
                n_cells: mesh.n_cells(),
            });
        }
        if !reference.value.is_finite() {
            return Err(ReferenceError::NonFiniteValue(reference.value));
        }
        Ok(Self::Pinned(reference))
    }

    /// Returns `true` if a reference cell is pinned.
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        matches!(self, Self::Pinned(_))
    }

    /// Adds the pinning weight to the reference row of a system built on the
    /// same mesh.
    ///
    /// The weight is the row's own diagonal, so the row stays diagonally
    /// dominant and the matrix stays symmetric. A row with no positive
    /// diagonal (a lone cell with no coupled neighbours) takes the mean of
    /// the positive diagonals instead, or `1` if there are none.
    pub fn constrain(&self, system: &mut LinearSystem) {
        if let Self::Pinned(reference) = self {
            let weight = pin_weight(system, reference.cell);
            system.add_to_diagonal(reference.cell, weight);
            system.add_source(reference.cell, weight * reference.value);
        }
    }

    /// Shifts a solved field so the reference cell holds the reference value.
    ///
    /// Returns the field unchanged when pinning is not needed.
    #[must_use]
    pub fn level(&self, mesh: &Mesh, mut field: ScalarField) -> ScalarField {
        let Self::Pinned(reference) = self else {
            return field;
        };
        let values = field.values_mut();
        let offset = reference.value - values[reference.cell];
        for v in values.iter_mut() {
            *v += offset;
        }
        values[reference.cell] = reference.value;
        field.correct_boundary_conditions(mesh);
        field
    }
}

#[allow(clippy::cast_precision_loss)]
fn pin_weight(system: &LinearSystem, row: usize) -> f64 {
    let own = system.diagonal(row);
    if own > 0.0 {
        return own;
    }
    let (sum, count) = system
        .matrix()
        .diagonal()
        .into_iter()
        .filter(|&d| d > 0.0)
        .fold((0.0, 0_usize), |(sum, count), d| (sum + d, count + 1));
    if count == 0 {
        return 1.0;
    }
    sum / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use plenum_core::BoundaryCondition::{Coupled, FixedValue, ZeroGradient};
    use plenum_core::CsrBuilder;

    fn line() -> Mesh {
        Mesh::line(3, 1.0).unwrap()
    }

    #[test]
    fn fixed_value_patch_removes_the_need() {
        assert!(!needs_reference(&[ZeroGradient, FixedValue(0.0)]));
        assert!(needs_reference(&[ZeroGradient, ZeroGradient]));
        assert!(needs_reference(&[Coupled, Coupled, ZeroGradient]));
        assert!(needs_reference(&[]));
    }

    #[test]
    fn not_needed_ignores_reference() {
        let mesh = line();
        let pinning = Pinning::new(&mesh, &[FixedValue(1.0), ZeroGradient], None).unwrap();
        assert_eq!(pinning, Pinning::NotNeeded);

        // Even an invalid reference is ignored.
        let pinning =
            Pinning::new(&mesh, &[FixedValue(1.0), ZeroGradient], Some(ReferenceCell::new(99, 0.0)))
                .unwrap();
        assert!(!pinning.is_pinned());
    }

    #[test]
    fn not_needed_is_a_no_op() {
        let mesh = line();
        let field = ScalarField::new(
            &mesh,
            vec![0.1, -7.25, 1e300],
            vec![FixedValue(3.0), ZeroGradient],
        )
        .unwrap();
        let mut builder = CsrBuilder::new(3);
        builder.add(0, 0, 2.0);
        let mut system = LinearSystem::new(builder.build(), vec![1.0, 2.0, 3.0]).unwrap();
        let before = system.clone();

        Pinning::NotNeeded.constrain(&mut system);
        let leveled = Pinning::NotNeeded.level(&mesh, field.clone());

        assert_eq!(system, before);
        assert_eq!(leveled, field);
        for (a, b) in leveled.values().iter().zip(field.values()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn validates_reference_when_needed() {
        let mesh = line();
        let free = [ZeroGradient, ZeroGradient];

        assert_eq!(Pinning::new(&mesh, &free, None), Err(ReferenceError::Missing));
        assert_eq!(
            Pinning::new(&mesh, &free, Some(ReferenceCell::new(3, 0.0))),
            Err(ReferenceError::CellOutOfRange { cell: 3, n_cells: 3 })
        );
        assert!(matches!(
            Pinning::new(&mesh, &free, Some(ReferenceCell::new(0, f64::NAN))),
            Err(ReferenceError::NonFiniteValue(_))
        ));
    }

    #[test]
    fn constrain_doubles_reference_diagonal() {
        let mesh = line();
        let pinning =
            Pinning::new(&mesh, &[ZeroGradient, ZeroGradient], Some(ReferenceCell::new(1, 2.0)))
                .unwrap();
        let mut builder = CsrBuilder::new(3);
        for row in 0..3 {
            builder.add(row, row, 1.5);
        }
        let mut system = LinearSystem::new(builder.build(), vec![0.0, 1.0, 0.0]).unwrap();

        pinning.constrain(&mut system);

        assert_eq!(system.matrix().diagonal(), [1.5, 3.0, 1.5]);
        assert_eq!(system.source(), [0.0, 4.0, 0.0]);
    }

    #[test]
    fn zero_diagonal_takes_a_positive_weight() {
        let mesh = line();
        let free = [ZeroGradient, ZeroGradient];

        // Other rows set the weight when the reference row is empty.
        let pinning = Pinning::new(&mesh, &free, Some(ReferenceCell::new(0, 2.0))).unwrap();
        let mut builder = CsrBuilder::new(3);
        builder.add(1, 1, 2.0);
        builder.add(2, 2, 4.0);
        let mut system = LinearSystem::new(builder.build(), vec![0.0; 3]).unwrap();
        pinning.constrain(&mut system);
        assert_eq!(system.matrix().diagonal(), [3.0, 2.0, 4.0]);
        assert_eq!(system.source(), [6.0, 0.0, 0.0]);

        // An all-zero matrix falls back to a unit weight.
        let mut system = LinearSystem::new(CsrBuilder::new(3).build(), vec![0.0; 3]).unwrap();
        pinning.constrain(&mut system);
        assert_eq!(system.matrix().diagonal(), [1.0, 0.0, 0.0]);
        assert_eq!(system.source(), [2.0, 0.0, 0.0]);
    }

    #[test]
    fn level_hits_reference_exactly() {
        let mesh = line();
        let pinning =
            Pinning::new(&mesh, &[ZeroGradient, ZeroGradient], Some(ReferenceCell::new(2, 0.3)))
                .unwrap();
        let field =
            ScalarField::new(&mesh, vec![10.1, 11.7, 12.9], vec![ZeroGradient, ZeroGradient])
                .unwrap();

        let leveled = pinning.level(&mesh, field);

        assert_eq!(leveled.values()[2], 0.3);
        approx::assert_relative_eq!(leveled.values()[0], 0.3 - 2.8, epsilon = 1e-12);
        approx::assert_relative_eq!(leveled.values()[1], 0.3 - 1.2, epsilon = 1e-12);
        // Boundary values follow the shifted cells.
        assert_eq!(leveled.boundary_values()[1], 0.3);
    }
}
