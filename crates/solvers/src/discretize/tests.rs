use approx::assert_relative_eq;
use plenum_core::BoundaryCondition::{Coupled, FixedValue, ZeroGradient};

use super::*;

/// Field equal to the x coordinate of each cell centre on a rectangle of
/// width `width`, with exact values on the left and right patches.
fn x_field(mesh: &Mesh, width: f64) -> ScalarField {
    let values = mesh.cells().iter().map(|c| c.centre.x).collect();
    ScalarField::new(
        mesh,
        values,
        vec![FixedValue(0.0), FixedValue(width), ZeroGradient, ZeroGradient],
    )
    .unwrap()
}

#[test]
fn interpolates_with_mesh_weights() {
    let mesh = Mesh::line(3, 1.0).unwrap();
    let field = ScalarField::new(&mesh, vec![1.0, 3.0, 7.0], vec![FixedValue(0.0), ZeroGradient])
        .unwrap();

    assert_eq!(interpolate(&mesh, &field), [2.0, 5.0, 0.0, 7.0]);
}

#[test]
fn face_flux_of_uniform_velocity() {
    let mesh = Mesh::rectangle(3, 2, 0.5, 2.0).unwrap();
    let u = Vector::new(1.0, 0.0, 0.0);
    let velocity = VectorField::uniform(&mesh, u, vec![FixedValue(u), ZeroGradient, ZeroGradient, ZeroGradient])
        .unwrap();

    let flux = face_flux(&mesh, &velocity);

    for (phi, f) in flux.values().iter().zip(mesh.faces()) {
        assert_relative_eq!(*phi, f.area.x);
    }
    // Uniform flow is divergence free.
    for div in divergence(&mesh, &flux) {
        assert_relative_eq!(div, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn gradient_of_linear_field_is_exact() {
    let mesh = Mesh::rectangle(4, 3, 0.25, 1.0 / 3.0).unwrap();
    let field = x_field(&mesh, 1.0);

    for g in gradient(&mesh, &field) {
        assert_relative_eq!(g, Vector::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }
}

#[test]
fn divergence_signs_faces_outward() {
    let mesh = Mesh::line(3, 1.0).unwrap();
    let flux = FaceField::new(&mesh, vec![1.0, 2.0, -0.5, 3.0]).unwrap();

    assert_eq!(divergence(&mesh, &flux), [0.5, 1.0, 1.0]);
}

#[test]
fn coefficients_follow_boundary_conditions() {
    let mesh = Mesh::line(2, 0.5).unwrap();
    let gamma = ScalarField::uniform(&mesh, 2.0, vec![ZeroGradient, ZeroGradient]).unwrap();

    let coeffs = SnGradCoefficients::new(&mesh, &gamma, &[FixedValue(1.0), ZeroGradient], None);

    // Interior: 2 * 1 / 0.5. Fixed boundary: 2 * 1 / 0.25. Zero gradient: none.
    assert_relative_eq!(coeffs.implicit()[0], 4.0);
    assert_relative_eq!(coeffs.implicit()[1], 8.0);
    assert_eq!(coeffs.implicit()[2], 0.0);
    assert!(coeffs.explicit().iter().all(|&c| c == 0.0));
}

#[test]
fn orthogonal_mesh_has_no_explicit_correction() {
    let mesh = Mesh::rectangle(3, 3, 1.0, 1.0).unwrap();
    let gamma = ScalarField::uniform(&mesh, 1.0, vec![ZeroGradient; 4]).unwrap();
    let field = x_field(&mesh, 3.0);
    let grad = gradient(&mesh, &field);

    let coeffs = SnGradCoefficients::new(&mesh, &gamma, field.conditions(), Some(&grad));

    for c in coeffs.explicit() {
        assert_relative_eq!(*c, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn laplacian_with_fixed_ends_is_satisfied_by_linear_field() {
    let mesh = Mesh::line(3, 1.0).unwrap();
    let gamma = ScalarField::uniform(&mesh, 1.0, vec![ZeroGradient, ZeroGradient]).unwrap();
    let field = ScalarField::new(&mesh, vec![0.5, 1.5, 2.5], vec![FixedValue(0.0), FixedValue(3.0)])
        .unwrap();
    let coeffs = SnGradCoefficients::new(&mesh, &gamma, field.conditions(), None);

    let system = laplacian(&mesh, &coeffs, &field);

    assert_eq!(system.matrix().diagonal(), [3.0, 2.0, 3.0]);
    assert_eq!(system.matrix().get(0, 1), -1.0);
    assert_eq!(system.source(), [0.0, 0.0, 6.0]);
    for r in system.residual(field.values()) {
        assert_relative_eq!(r, 0.0, epsilon = 1e-12);
    }

    // Diffusive fluxes of a linear field are uniform.
    for face in 0..mesh.n_faces() {
        assert_relative_eq!(coeffs.flux(&mesh, face, &field), mesh.faces()[face].area.x);
    }
}

#[test]
fn coupled_laplacian_is_symmetric_and_singular() {
    let mesh = Mesh::line(4, 1.0).unwrap().couple("left", "right").unwrap();
    let gamma = ScalarField::uniform(&mesh, 1.0, vec![Coupled, Coupled]).unwrap();
    let field = ScalarField::uniform(&mesh, 0.0, vec![Coupled, Coupled]).unwrap();
    let coeffs = SnGradCoefficients::new(&mesh, &gamma, field.conditions(), None);

    let system = laplacian(&mesh, &coeffs, &field);
    let matrix = system.matrix();

    assert_eq!(matrix.diagonal(), [2.0, 2.0, 2.0, 2.0]);
    assert_eq!(matrix.get(0, 3), -1.0);
    for row in 0..4 {
        let sum: f64 = matrix.row(row).map(|(_, v)| v).sum();
        assert_eq!(sum, 0.0);
        for col in 0..4 {
            assert_eq!(matrix.get(row, col), matrix.get(col, row));
        }
    }
}
