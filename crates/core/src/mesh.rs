//! Unstructured finite-volume mesh.
//!
//! A [`Mesh`] is a set of cells connected by faces. Faces are ordered with all
//! interior faces first, followed by boundary faces grouped contiguously by
//! [`Patch`]. Every face has an owner cell and its area vector points out of
//! the owner; interior faces also have a neighbour cell.
//!
//! Two patches of equal size can be coupled, in which case the i-th face of one
//! is connected to the i-th face of the other and values flow across the pair
//! as if the faces were interior.

mod error;
mod structured;

#[cfg(test)]
mod tests;

use std::ops::Range;

pub use error::MeshError;

use crate::Vector;

/// Lower bound on `n·d / |d|` used when computing delta coefficients, which
/// keeps coefficients bounded on highly non-orthogonal faces.
const MIN_ORTHOGONALITY: f64 = 0.05;

/// A control volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub centre: Vector,
    pub volume: f64,
}

/// A face between two cells, or between a cell and the boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub owner: usize,
    pub neighbour: Option<usize>,
    pub centre: Vector,
    /// Area vector, pointing out of the owner cell.
    pub area: Vector,
}

/// A named, contiguous range of boundary faces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    name: String,
    start: usize,
    size: usize,
    partner: Option<usize>,
}

impl Patch {
    /// Creates an uncoupled patch covering faces `start..start + size`.
    pub fn new(name: impl Into<String>, start: usize, size: usize) -> Self {
        Self {
            name: name.into(),
            start,
            size,
            partner: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the face indices covered by this patch.
    #[must_use]
    pub fn faces(&self) -> Range<usize> {
        self.start..self.start + self.size
    }

    /// Returns the index of the coupled partner patch, if any.
    #[must_use]
    pub fn partner(&self) -> Option<usize> {
        self.partner
    }

    #[must_use]
    pub fn is_coupled(&self) -> bool {
        self.partner.is_some()
    }
}

/// A validated finite-volume mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    cells: Vec<Cell>,
    faces: Vec<Face>,
    patches: Vec<Patch>,
    n_interior: usize,
}

impl Mesh {
    /// Creates a mesh, validating its connectivity and geometry.
    ///
    /// Patches are taken as given except for coupling, which is established
    /// afterwards with [`Mesh::couple`].
    ///
    /// # Errors
    ///
    /// Returns a [`MeshError`] if a cell volume is not positive, a face has a
    /// degenerate area vector or out-of-range cells, an interior face follows a
    /// boundary face, or the patches do not cover the boundary faces exactly
    /// and in order.
    pub fn new(cells: Vec<Cell>, faces: Vec<Face>, patches: Vec<Patch>) -> Result<Self, MeshError> {
        for (cell, c) in cells.iter().enumerate() {
            if !c.volume.is_finite() || c.volume <= 0.0 {
                return Err(MeshError::NonPositiveVolume {
                    cell,
                    volume: c.volume,
                });
            }
        }

        let n_cells = cells.len();
        let mut n_interior = 0;
        for (face, f) in faces.iter().enumerate() {
            if f.owner >= n_cells {
                return Err(MeshError::CellOutOfRange {
                    face,
                    cell: f.owner,
                });
            }
            let magnitude = f.area.norm();
            if !magnitude.is_finite() || magnitude == 0.0 {
                return Err(MeshError::DegenerateFace { face });
            }
            match f.neighbour {
                Some(_) if n_interior != face => {
                    return Err(MeshError::InteriorAfterBoundary { face });
                }
                Some(neighbour) if neighbour >= n_cells => {
                    return Err(MeshError::CellOutOfRange {
                        face,
                        cell: neighbour,
                    });
                }
                Some(neighbour) if neighbour == f.owner => {
                    return Err(MeshError::SelfNeighbour { face });
                }
                Some(_) => n_interior += 1,
                None => {}
            }
        }

        let mut expected = n_interior;
        for (index, patch) in patches.iter().enumerate() {
            if patches[..index].iter().any(|p| p.name == patch.name) {
                return Err(MeshError::DuplicatePatch(patch.name.clone()));
            }
            if patch.start != expected {
                return Err(MeshError::PatchGap {
                    patch: patch.name.clone(),
                    expected,
                    start: patch.start,
                });
            }
            expected += patch.size;
        }
        if expected != faces.len() {
            return Err(MeshError::UncoveredFaces {
                covered: expected,
                faces: faces.len(),
            });
        }

        let patches = patches
            .into_iter()
            .map(|patch| Patch {
                partner: None,
                ..patch
            })
            .collect();

        Ok(Self {
            cells,
            faces,
            patches,
            n_interior,
        })
    }

    /// Couples the patches named `a` and `b` so that their faces are matched
    /// one-to-one in order.
    ///
    /// # Errors
    ///
    /// Returns an error if either patch is unknown or already coupled, if the
    /// names refer to the same patch, or if their sizes differ.
    pub fn couple(mut self, a: &str, b: &str) -> Result<Self, MeshError> {
        let ia = self
            .patch_index(a)
            .ok_or_else(|| MeshError::UnknownPatch(a.to_owned()))?;
        let ib = self
            .patch_index(b)
            .ok_or_else(|| MeshError::UnknownPatch(b.to_owned()))?;

        if ia == ib {
            return Err(MeshError::SelfCoupled(a.to_owned()));
        }
        for &i in &[ia, ib] {
            if self.patches[i].is_coupled() {
                return Err(MeshError::AlreadyCoupled(self.patches[i].name.clone()));
            }
        }
        if self.patches[ia].size != self.patches[ib].size {
            return Err(MeshError::PatchSizeMismatch {
                a: a.to_owned(),
                b: b.to_owned(),
            });
        }

        self.patches[ia].partner = Some(ib);
        self.patches[ib].partner = Some(ia);
        Ok(self)
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[must_use]
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    #[must_use]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    /// Returns the number of boundary faces.
    #[must_use]
    pub fn n_boundary_faces(&self) -> usize {
        self.faces.len() - self.n_interior
    }

    #[must_use]
    pub fn interior_faces(&self) -> Range<usize> {
        0..self.n_interior
    }

    #[must_use]
    pub fn boundary_faces(&self) -> Range<usize> {
        self.n_interior..self.faces.len()
    }

    /// Returns the index of the patch with the given name.
    #[must_use]
    pub fn patch_index(&self, name: &str) -> Option<usize> {
        self.patches.iter().position(|p| p.name == name)
    }

    /// Returns the index of the patch containing a boundary face.
    ///
    /// Returns `None` for interior faces.
    #[must_use]
    pub fn patch_of(&self, face: usize) -> Option<usize> {
        if face < self.n_interior {
            return None;
        }
        let index = self.patches.partition_point(|p| p.start + p.size <= face);
        (index < self.patches.len()).then_some(index)
    }

    /// Returns the matching face on the partner patch of a coupled face.
    #[must_use]
    pub fn partner_face(&self, face: usize) -> Option<usize> {
        let patch = &self.patches[self.patch_of(face)?];
        let partner = &self.patches[patch.partner?];
        Some(partner.start + (face - patch.start))
    }

    /// Returns the cell on the far side of a face: the neighbour of an
    /// interior face or the owner of the partner face of a coupled face.
    #[must_use]
    pub fn far_cell(&self, face: usize) -> Option<usize> {
        self.faces[face]
            .neighbour
            .or_else(|| self.partner_face(face).map(|g| self.faces[g].owner))
    }

    /// Returns the sum of all cell volumes.
    #[must_use]
    pub fn total_volume(&self) -> f64 {
        self.cells.iter().map(|c| c.volume).sum()
    }

    /// Returns the unit normal of a face.
    #[must_use]
    pub fn normal(&self, face: usize) -> Vector {
        let area = self.faces[face].area;
        area / area.norm()
    }

    /// Returns the vector from the owner centre to the far cell centre.
    ///
    /// For coupled faces the vector passes through the partner face, and for
    /// other boundary faces it ends at the face centre.
    #[must_use]
    pub fn delta(&self, face: usize) -> Vector {
        let f = &self.faces[face];
        let owner = self.cells[f.owner].centre;
        if let Some(neighbour) = f.neighbour {
            return self.cells[neighbour].centre - owner;
        }
        match self.partner_face(face) {
            Some(g) => {
                let partner = &self.faces[g];
                (f.centre - owner) + (self.cells[partner.owner].centre - partner.centre)
            }
            None => f.centre - owner,
        }
    }

    /// Returns the linear interpolation weight of the owner value at a face.
    ///
    /// The face value of a field is `w * owner + (1 - w) * far`. Plain
    /// boundary faces have a weight of one.
    #[must_use]
    pub fn weight(&self, face: usize) -> f64 {
        let f = &self.faces[face];
        let n = self.normal(face);
        let owner_distance = n.dot(&(f.centre - self.cells[f.owner].centre)).abs();
        let far_distance = if let Some(neighbour) = f.neighbour {
            n.dot(&(self.cells[neighbour].centre - f.centre)).abs()
        } else if let Some(g) = self.partner_face(face) {
            let partner = &self.faces[g];
            self.normal(g)
                .dot(&(partner.centre - self.cells[partner.owner].centre))
                .abs()
        } else {
            return 1.0;
        };
        let total = owner_distance + far_distance;
        if total > 0.0 {
            far_distance / total
        } else {
            0.5
        }
    }

    /// Returns the inverse normal distance used by the face-normal gradient,
    /// `1 / max(n·d, 0.05 |d|)`.
    #[must_use]
    pub fn delta_coeff(&self, face: usize) -> f64 {
        let d = self.delta(face);
        let n = self.normal(face);
        1.0 / n.dot(&d).max(MIN_ORTHOGONALITY * d.norm())
    }

    /// Returns the non-orthogonal correction vector `n - d * delta_coeff`.
    ///
    /// The vector is zero on orthogonal faces and on plain boundary faces.
    #[must_use]
    pub fn correction_vector(&self, face: usize) -> Vector {
        if self.far_cell(face).is_none() {
            return Vector::zeros();
        }
        self.normal(face) - self.delta(face) * self.delta_coeff(face)
    }
}
