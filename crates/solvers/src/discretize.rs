//! Finite-volume operators.
//!
//! Free functions over [`CellField`]s and [`FaceField`]s. Face values use
//! linear interpolation, gradients use the Gauss theorem, and the Laplacian is
//! assembled in positive form, `Σ_f a_f (φ_P - φ_N) = b_P`, which gives a
//! symmetric matrix with a non-negative diagonal.

use plenum_core::{
    Blend, BoundaryCondition, CellField, CsrBuilder, FaceField, LinearSystem, Mesh, ScalarField,
    Vector, VectorField,
};

/// Interpolates a cell field to every face.
///
/// Interior and coupled faces blend the two adjacent cells by the mesh
/// weights; other boundary faces take the evaluated boundary value.
pub fn interpolate<T: Blend>(mesh: &Mesh, field: &CellField<T>) -> Vec<T> {
    let values = field.values();
    let boundary = mesh.boundary_faces();
    mesh.faces()
        .iter()
        .enumerate()
        .map(|(face, f)| match f.neighbour {
            Some(neighbour) => values[neighbour].blend(&values[f.owner], mesh.weight(face)),
            None => field.boundary_values()[face - boundary.start],
        })
        .collect()
}

/// Returns the volumetric flux `U_f · S_f` through every face.
pub fn face_flux(mesh: &Mesh, velocity: &VectorField) -> FaceField {
    let mut flux = FaceField::zeros(mesh);
    let u_f = interpolate(mesh, velocity);
    for ((phi, u), f) in flux.values_mut().iter_mut().zip(&u_f).zip(mesh.faces()) {
        *phi = u.dot(&f.area);
    }
    flux
}

/// Returns the Gauss linear gradient of a scalar field in every cell,
/// `(1 / V) Σ_f φ_f S_f`.
pub fn gradient(mesh: &Mesh, field: &ScalarField) -> Vec<Vector> {
    let face_values = interpolate(mesh, field);
    let mut grad = vec![Vector::zeros(); mesh.n_cells()];
    for (f, phi) in mesh.faces().iter().zip(face_values) {
        let contribution = f.area * phi;
        grad[f.owner] += contribution;
        if let Some(neighbour) = f.neighbour {
            grad[neighbour] -= contribution;
        }
    }
    for (g, cell) in grad.iter_mut().zip(mesh.cells()) {
        *g /= cell.volume;
    }
    grad
}

/// Returns the net flux out of every cell, `Σ_f phi_f` with faces signed
/// outward. The result is not divided by the cell volume.
pub fn divergence(mesh: &Mesh, flux: &FaceField) -> Vec<f64> {
    let mut div = vec![0.0; mesh.n_cells()];
    for (f, phi) in mesh.faces().iter().zip(flux.values()) {
        div[f.owner] += phi;
        if let Some(neighbour) = f.neighbour {
            div[neighbour] -= phi;
        }
    }
    div
}

/// Face coefficients of the diffusive flux `Γ_f |S_f| ∂φ/∂n`.
///
/// The flux out of the owner through face `f` is
/// `a_f (φ_far - φ_P) + c_f`, where `a_f = Γ_f |S_f| / (n·d)` is the implicit
/// coefficient and `c_f = Γ_f |S_f| k·(∇φ)_f` is the explicit non-orthogonal
/// correction. Sharing one set of coefficients between assembly and flux
/// reconstruction is what makes the reconstructed flux conservative.
#[derive(Debug, Clone, PartialEq)]
pub struct SnGradCoefficients {
    implicit: Vec<f64>,
    explicit: Vec<f64>,
}

impl SnGradCoefficients {
    /// Computes coefficients for diffusivity `gamma` and the boundary
    /// conditions of the transported field.
    ///
    /// The explicit correction uses `explicit_gradient` (one gradient per cell)
    /// when given and is zero otherwise. It is always zero on boundary faces
    /// that are not coupled. Zero-gradient boundary faces carry no flux.
    pub fn new(
        mesh: &Mesh,
        gamma: &ScalarField,
        conditions: &[BoundaryCondition<f64>],
        explicit_gradient: Option<&[Vector]>,
    ) -> Self {
        let gamma_f = interpolate(mesh, gamma);
        let n_faces = mesh.n_faces();
        let mut implicit = vec![0.0; n_faces];
        let mut explicit = vec![0.0; n_faces];

        for face in 0..n_faces {
            let carries_flux = match mesh.patch_of(face) {
                None => true,
                Some(patch) => !matches!(conditions[patch], BoundaryCondition::ZeroGradient),
            };
            if !carries_flux {
                continue;
            }

            let magnitude = gamma_f[face] * mesh.faces()[face].area.norm();
            implicit[face] = magnitude * mesh.delta_coeff(face);

            if let (Some(grad), Some(far)) = (explicit_gradient, mesh.far_cell(face)) {
                let owner = mesh.faces()[face].owner;
                let grad_f = grad[far].blend(&grad[owner], mesh.weight(face));
                explicit[face] = magnitude * mesh.correction_vector(face).dot(&grad_f);
            }
        }

        Self { implicit, explicit }
    }

    /// Returns the implicit coefficient `a_f` of every face.
    #[must_use]
    pub fn implicit(&self) -> &[f64] {
        &self.implicit
    }

    /// Returns the explicit non-orthogonal correction `c_f` of every face.
    #[must_use]
    pub fn explicit(&self) -> &[f64] {
        &self.explicit
    }

    /// Returns the diffusive flux of `field` out of the owner of `face`.
    #[must_use]
    pub fn flux(&self, mesh: &Mesh, face: usize, field: &ScalarField) -> f64 {
        let owner = field.values()[mesh.faces()[face].owner];
        let far = match mesh.far_cell(face) {
            Some(cell) => field.values()[cell],
            None => *field.boundary_value(mesh, face),
        };
        self.implicit[face] * (far - owner) + self.explicit[face]
    }
}

/// Assembles the negated Laplacian `-∇·(Γ∇φ)` integrated over each cell.
///
/// Row `P` reads `Σ_f a_f (φ_P - φ_far) = Σ_f ±c_f + Σ_b a_b φ_b`, where the
/// explicit correction is signed outward from `P` and `φ_b` are the
/// fixed boundary values of `field`. Coupled faces contribute off-diagonal
/// entries to the partner-side cell.
pub fn laplacian(mesh: &Mesh, coeffs: &SnGradCoefficients, field: &ScalarField) -> LinearSystem {
    let n = mesh.n_cells();
    let mut builder = CsrBuilder::new(n);
    let mut source = vec![0.0; n];
    let mut add = |row, col, value| builder.add(row, col, value);

    for (face, f) in mesh.faces().iter().enumerate() {
        let a = coeffs.implicit[face];
        let c = coeffs.explicit[face];
        match (f.neighbour, mesh.far_cell(face)) {
            (Some(neighbour), _) => {
                add(f.owner, f.owner, a);
                add(f.owner, neighbour, -a);
                add(neighbour, neighbour, a);
                add(neighbour, f.owner, -a);
                source[f.owner] += c;
                source[neighbour] -= c;
            }
            (None, Some(partner_cell)) => {
                // The partner face assembles the partner cell's row.
                add(f.owner, f.owner, a);
                add(f.owner, partner_cell, -a);
                source[f.owner] += c;
            }
            (None, None) => {
                add(f.owner, f.owner, a);
                source[f.owner] += a * field.boundary_value(mesh, face);
            }
        }
    }

    let mut system = LinearSystem::homogeneous(builder.build());
    for (cell, b) in source.into_iter().enumerate() {
        system.add_source(cell, b);
    }
    system
}

#[cfg(test)]
mod tests;
