//! Cell and face fields.

use thiserror::Error;

use crate::{Blend, Mesh, Vector};

/// How a field behaves on a boundary patch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryCondition<T> {
    /// The boundary value is prescribed.
    FixedValue(T),

    /// The boundary value follows the owner cell, so the normal gradient (and
    /// the diffusive flux) through the patch is zero.
    ZeroGradient,

    /// The patch is connected to its partner patch and behaves like an
    /// interior face.
    Coupled,
}

impl<T> BoundaryCondition<T> {
    /// Returns `true` if this condition prescribes an absolute value.
    ///
    /// Zero-gradient and coupled patches leave the level of a field free.
    #[must_use]
    pub fn fixes_level(&self) -> bool {
        matches!(self, Self::FixedValue(_))
    }
}

/// Errors that can occur when building a field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("expected {expected} cell values, found {found}")]
    CellCount { expected: usize, found: usize },

    #[error("expected {expected} face values, found {found}")]
    FaceCount { expected: usize, found: usize },

    #[error("expected {expected} boundary conditions, found {found}")]
    PatchCount { expected: usize, found: usize },

    #[error("patch `{patch}` must be coupled exactly when the mesh couples it")]
    CouplingMismatch { patch: String },
}

/// A value per cell with a boundary condition per patch.
///
/// Boundary values (one per boundary face) are derived from the conditions by
/// [`correct_boundary_conditions`][CellField::correct_boundary_conditions],
/// which must be called after cell values change.
#[derive(Debug, Clone, PartialEq)]
pub struct CellField<T> {
    values: Vec<T>,
    conditions: Vec<BoundaryCondition<T>>,
    boundary: Vec<T>,
}

/// A scalar cell field.
pub type ScalarField = CellField<f64>;

/// A vector cell field.
pub type VectorField = CellField<Vector>;

impl<T: Blend> CellField<T> {
    /// Creates a field and evaluates its boundary values.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of values or conditions does not match
    /// the mesh, or if a [`BoundaryCondition::Coupled`] condition is set on an
    /// uncoupled patch (or vice versa).
    pub fn new(
        mesh: &Mesh,
        values: Vec<T>,
        conditions: Vec<BoundaryCondition<T>>,
    ) -> Result<Self, FieldError> {
        if values.len() != mesh.n_cells() {
            return Err(FieldError::CellCount {
                expected: mesh.n_cells(),
                found: values.len(),
            });
        }
        if conditions.len() != mesh.patches().len() {
            return Err(FieldError::PatchCount {
                expected: mesh.patches().len(),
                found: conditions.len(),
            });
        }
        for (patch, condition) in mesh.patches().iter().zip(&conditions) {
            let coupled = matches!(condition, BoundaryCondition::Coupled);
            if coupled != patch.is_coupled() {
                return Err(FieldError::CouplingMismatch {
                    patch: patch.name().to_owned(),
                });
            }
        }

        let boundary = mesh
            .boundary_faces()
            .map(|face| values[mesh.faces()[face].owner])
            .collect();
        let mut field = Self {
            values,
            conditions,
            boundary,
        };
        field.correct_boundary_conditions(mesh);
        Ok(field)
    }

    /// Creates a field with the same value in every cell.
    ///
    /// # Errors
    ///
    /// See [`CellField::new`].
    pub fn uniform(
        mesh: &Mesh,
        value: T,
        conditions: Vec<BoundaryCondition<T>>,
    ) -> Result<Self, FieldError> {
        Self::new(mesh, vec![value; mesh.n_cells()], conditions)
    }

    /// Re-evaluates boundary values from the cell values.
    pub fn correct_boundary_conditions(&mut self, mesh: &Mesh) {
        let offset = mesh.interior_faces().len();
        for (patch, condition) in mesh.patches().iter().zip(&self.conditions) {
            for face in patch.faces() {
                let owner = self.values[mesh.faces()[face].owner];
                self.boundary[face - offset] = match condition {
                    BoundaryCondition::FixedValue(value) => *value,
                    BoundaryCondition::ZeroGradient => owner,
                    BoundaryCondition::Coupled => match mesh.far_cell(face) {
                        Some(far) => self.values[far].blend(&owner, mesh.weight(face)),
                        None => owner,
                    },
                };
            }
        }
    }

    /// Returns a field with the same conditions and new cell values.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of values does not match the mesh.
    pub fn with_values(&self, mesh: &Mesh, values: Vec<T>) -> Result<Self, FieldError> {
        Self::new(mesh, values, self.conditions.clone())
    }
}

impl<T> CellField<T> {
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Returns the cell values for in-place updates.
    ///
    /// Boundary values are stale until
    /// [`correct_boundary_conditions`][CellField::correct_boundary_conditions]
    /// is called.
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    #[must_use]
    pub fn conditions(&self) -> &[BoundaryCondition<T>] {
        &self.conditions
    }

    /// Returns the evaluated value on each boundary face, in face order.
    #[must_use]
    pub fn boundary_values(&self) -> &[T] {
        &self.boundary
    }

    /// Returns the evaluated value on a boundary face.
    ///
    /// # Panics
    ///
    /// Panics if `face` is not a boundary face of the mesh the field was
    /// built on.
    #[must_use]
    pub fn boundary_value(&self, mesh: &Mesh, face: usize) -> &T {
        &self.boundary[face - mesh.interior_faces().len()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn into_values(self) -> Vec<T> {
        self.values
    }
}

/// A scalar value per face, such as the volumetric flux.
///
/// Flux values are signed along the face area vector, so a positive value
/// leaves the owner cell.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceField {
    values: Vec<f64>,
}

impl FaceField {
    /// Creates a face field.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of values does not match the mesh faces.
    pub fn new(mesh: &Mesh, values: Vec<f64>) -> Result<Self, FieldError> {
        if values.len() != mesh.n_faces() {
            return Err(FieldError::FaceCount {
                expected: mesh.n_faces(),
                found: values.len(),
            });
        }
        Ok(Self { values })
    }

    /// Creates a face field of zeros.
    #[must_use]
    pub fn zeros(mesh: &Mesh) -> Self {
        Self {
            values: vec![0.0; mesh.n_faces()],
        }
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use BoundaryCondition::{Coupled, FixedValue, ZeroGradient};

    #[test]
    fn evaluates_boundary_values() {
        let mesh = Mesh::line(3, 1.0).unwrap();
        let field =
            ScalarField::new(&mesh, vec![1.0, 2.0, 3.0], vec![FixedValue(-5.0), ZeroGradient])
                .unwrap();

        assert_eq!(field.boundary_values(), [-5.0, 3.0]);
        assert_eq!(*field.boundary_value(&mesh, 3), 3.0);
    }

    #[test]
    fn coupled_boundary_interpolates_across_the_seam() {
        let mesh = Mesh::line(4, 1.0).unwrap().couple("left", "right").unwrap();
        let field = ScalarField::new(&mesh, vec![1.0, 2.0, 3.0, 5.0], vec![Coupled, Coupled]).unwrap();

        assert_relative_eq!(field.boundary_values()[0], 3.0);
        assert_relative_eq!(field.boundary_values()[1], 3.0);
    }

    #[test]
    fn vector_field_boundary_values() {
        let mesh = Mesh::rectangle(2, 2, 1.0, 1.0).unwrap();
        let inlet = Vector::new(1.0, 0.0, 0.0);
        let field = VectorField::uniform(
            &mesh,
            Vector::new(0.5, 0.5, 0.0),
            vec![FixedValue(inlet), ZeroGradient, FixedValue(Vector::zeros()), ZeroGradient],
        )
        .unwrap();

        let left = &mesh.patches()[0];
        for face in left.faces() {
            assert_eq!(*field.boundary_value(&mesh, face), inlet);
        }
        let top = &mesh.patches()[3];
        for face in top.faces() {
            assert_eq!(*field.boundary_value(&mesh, face), Vector::new(0.5, 0.5, 0.0));
        }
    }

    #[test]
    fn corrects_after_mutation() {
        let mesh = Mesh::line(2, 1.0).unwrap();
        let mut field = ScalarField::uniform(&mesh, 0.0, vec![ZeroGradient, ZeroGradient]).unwrap();

        field.values_mut()[1] = 4.0;
        assert_eq!(field.boundary_values(), [0.0, 0.0]);

        field.correct_boundary_conditions(&mesh);
        assert_eq!(field.boundary_values(), [0.0, 4.0]);
    }

    #[test]
    fn rejects_mismatched_inputs() {
        let mesh = Mesh::line(2, 1.0).unwrap();

        assert_eq!(
            ScalarField::new(&mesh, vec![0.0], vec![ZeroGradient, ZeroGradient]),
            Err(FieldError::CellCount {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            ScalarField::uniform(&mesh, 0.0, vec![ZeroGradient]),
            Err(FieldError::PatchCount {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            ScalarField::uniform(&mesh, 0.0, vec![Coupled, ZeroGradient]),
            Err(FieldError::CouplingMismatch {
                patch: "left".into()
            })
        );
        assert_eq!(
            FaceField::new(&mesh, vec![0.0; 2]),
            Err(FieldError::FaceCount {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn fixes_level() {
        assert!(FixedValue(0.0).fixes_level());
        assert!(!BoundaryCondition::<f64>::ZeroGradient.fixes_level());
        assert!(!BoundaryCondition::<f64>::Coupled.fixes_level());
    }
}
