use crate::Vector;

use super::{Cell, Face, Mesh, MeshError, Patch};

impl Mesh {
    /// Builds a one-dimensional row of `n` cells of length `dx` along x.
    ///
    /// Cells have a unit cross-section. The boundary patches are `left` and
    /// `right`, one face each.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidDimensions`] if `n` is zero or `dx` is not
    /// positive and finite.
    pub fn line(n: usize, dx: f64) -> Result<Self, MeshError> {
        Self::rectangle(n, 1, dx, 1.0).and_then(|mesh| mesh.drop_lateral_patches())
    }

    /// Builds an `nx` by `ny` grid of `dx` by `dy` cells with unit depth.
    ///
    /// Cell `(i, j)` has index `j * nx + i`. Interior faces normal to x come
    /// first, then those normal to y. Boundary patches are `left`, `right`,
    /// `bottom`, and `top`, ordered along their edge.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidDimensions`] if a cell count is zero or a
    /// spacing is not positive and finite.
    pub fn rectangle(nx: usize, ny: usize, dx: f64, dy: f64) -> Result<Self, MeshError> {
        let valid = |d: f64| d.is_finite() && d > 0.0;
        if nx == 0 || ny == 0 || !valid(dx) || !valid(dy) {
            return Err(MeshError::InvalidDimensions);
        }

        let id = |i: usize, j: usize| j * nx + i;
        #[allow(clippy::cast_precision_loss)]
        let at = |x: usize, y: usize| (x as f64, y as f64);

        let mut cells = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let (x, y) = at(i, j);
                cells.push(Cell {
                    centre: Vector::new((x + 0.5) * dx, (y + 0.5) * dy, 0.5),
                    volume: dx * dy,
                });
            }
        }

        let x_face = |owner, neighbour, i: usize, j: usize, sign: f64| {
            let (x, y) = at(i, j);
            Face {
                owner,
                neighbour,
                centre: Vector::new(x * dx, (y + 0.5) * dy, 0.5),
                area: Vector::new(sign * dy, 0.0, 0.0),
            }
        };
        let y_face = |owner, neighbour, i: usize, j: usize, sign: f64| {
            let (x, y) = at(i, j);
            Face {
                owner,
                neighbour,
                centre: Vector::new((x + 0.5) * dx, y * dy, 0.5),
                area: Vector::new(0.0, sign * dx, 0.0),
            }
        };

        let mut faces = Vec::new();
        for j in 0..ny {
            for i in 1..nx {
                faces.push(x_face(id(i - 1, j), Some(id(i, j)), i, j, 1.0));
            }
        }
        for j in 1..ny {
            for i in 0..nx {
                faces.push(y_face(id(i, j - 1), Some(id(i, j)), i, j, 1.0));
            }
        }

        let mut patches = Vec::with_capacity(4);
        let mut boundary = |name: &str, new_faces: Vec<Face>, faces: &mut Vec<Face>| {
            patches.push(Patch::new(name, faces.len(), new_faces.len()));
            faces.extend(new_faces);
        };
        boundary(
            "left",
            (0..ny).map(|j| x_face(id(0, j), None, 0, j, -1.0)).collect(),
            &mut faces,
        );
        boundary(
            "right",
            (0..ny)
                .map(|j| x_face(id(nx - 1, j), None, nx, j, 1.0))
                .collect(),
            &mut faces,
        );
        boundary(
            "bottom",
            (0..nx).map(|i| y_face(id(i, 0), None, i, 0, -1.0)).collect(),
            &mut faces,
        );
        boundary(
            "top",
            (0..nx)
                .map(|i| y_face(id(i, ny - 1), None, i, ny, 1.0))
                .collect(),
            &mut faces,
        );

        Self::new(cells, faces, patches)
    }

    /// Removes the `bottom` and `top` patches of a single-row rectangle, which
    /// are the last faces in the list.
    fn drop_lateral_patches(self) -> Result<Self, MeshError> {
        let Self {
            cells,
            mut faces,
            mut patches,
            ..
        } = self;
        patches.retain(|p| p.name() != "bottom" && p.name() != "top");
        let keep = patches.last().map_or(faces.len(), |p| p.start() + p.size());
        faces.truncate(keep);
        Self::new(cells, faces, patches)
    }
}
