use approx::assert_relative_eq;

use super::*;

/// Two unit cells side by side with one interior face and no boundary.
fn closed_pair() -> (Vec<Cell>, Vec<Face>) {
    let cells = vec![
        Cell {
            centre: Vector::new(0.5, 0.5, 0.5),
            volume: 1.0,
        },
        Cell {
            centre: Vector::new(1.5, 0.5, 0.5),
            volume: 1.0,
        },
    ];
    let faces = vec![Face {
        owner: 0,
        neighbour: Some(1),
        centre: Vector::new(1.0, 0.5, 0.5),
        area: Vector::new(1.0, 0.0, 0.0),
    }];
    (cells, faces)
}

#[test]
fn line_layout() {
    let mesh = Mesh::line(3, 0.5).unwrap();

    assert_eq!(mesh.n_cells(), 3);
    assert_eq!(mesh.n_faces(), 4);
    assert_eq!(mesh.interior_faces(), 0..2);
    assert_eq!(mesh.boundary_faces(), 2..4);

    let names: Vec<_> = mesh.patches().iter().map(Patch::name).collect();
    assert_eq!(names, ["left", "right"]);

    assert_relative_eq!(mesh.total_volume(), 1.5);
    assert_eq!(mesh.faces()[2].owner, 0);
    assert_eq!(mesh.faces()[3].owner, 2);
    assert_relative_eq!(mesh.faces()[2].area, Vector::new(-1.0, 0.0, 0.0));
}

#[test]
fn rectangle_layout() {
    let mesh = Mesh::rectangle(3, 2, 1.0, 2.0).unwrap();

    assert_eq!(mesh.n_cells(), 6);
    // 2 rows of 2 x-faces plus 1 row of 3 y-faces.
    assert_eq!(mesh.interior_faces().len(), 7);
    assert_eq!(mesh.n_boundary_faces(), 10);

    let top = &mesh.patches()[mesh.patch_index("top").unwrap()];
    assert_eq!(top.size(), 3);
    for face in top.faces() {
        assert_relative_eq!(mesh.faces()[face].area, Vector::new(0.0, 1.0, 0.0));
        assert_relative_eq!(mesh.faces()[face].centre.y, 4.0);
    }

    // Area vectors of every closed cell sum to zero.
    let mut sums = vec![Vector::zeros(); mesh.n_cells()];
    for f in mesh.faces() {
        sums[f.owner] += f.area;
        if let Some(n) = f.neighbour {
            sums[n] -= f.area;
        }
    }
    for sum in sums {
        assert_relative_eq!(sum.norm(), 0.0, epsilon = 1e-12);
    }
}

#[test]
fn rejects_invalid_dimensions() {
    assert_eq!(Mesh::line(0, 1.0), Err(MeshError::InvalidDimensions));
    assert_eq!(Mesh::rectangle(2, 2, 1.0, -1.0), Err(MeshError::InvalidDimensions));
    assert_eq!(Mesh::line(2, f64::NAN), Err(MeshError::InvalidDimensions));
}

#[test]
fn rejects_bad_cells_and_faces() {
    let (mut cells, faces) = closed_pair();
    cells[1].volume = 0.0;
    assert!(matches!(
        Mesh::new(cells, faces, vec![]),
        Err(MeshError::NonPositiveVolume { cell: 1, .. })
    ));

    let (cells, mut faces) = closed_pair();
    faces[0].neighbour = Some(7);
    assert_eq!(
        Mesh::new(cells, faces, vec![]),
        Err(MeshError::CellOutOfRange { face: 0, cell: 7 })
    );

    let (cells, mut faces) = closed_pair();
    faces[0].area = Vector::zeros();
    assert_eq!(
        Mesh::new(cells, faces, vec![]),
        Err(MeshError::DegenerateFace { face: 0 })
    );
}

#[test]
fn rejects_misordered_faces_and_patches() {
    let (cells, mut faces) = closed_pair();
    let boundary = Face {
        owner: 0,
        neighbour: None,
        centre: Vector::new(0.0, 0.5, 0.5),
        area: Vector::new(-1.0, 0.0, 0.0),
    };
    faces.insert(0, boundary);
    assert_eq!(
        Mesh::new(cells.clone(), faces.clone(), vec![Patch::new("wall", 0, 1)]),
        Err(MeshError::InteriorAfterBoundary { face: 1 })
    );

    faces.swap(0, 1);
    assert_eq!(
        Mesh::new(cells.clone(), faces.clone(), vec![Patch::new("wall", 0, 1)]),
        Err(MeshError::PatchGap {
            patch: "wall".into(),
            expected: 1,
            start: 0,
        })
    );
    assert_eq!(
        Mesh::new(cells.clone(), faces.clone(), vec![]),
        Err(MeshError::UncoveredFaces {
            covered: 1,
            faces: 2,
        })
    );
    assert!(Mesh::new(cells, faces, vec![Patch::new("wall", 1, 1)]).is_ok());
}

#[test]
fn interior_geometry() {
    let mesh = Mesh::line(4, 2.0).unwrap();

    assert_relative_eq!(mesh.delta(1), Vector::new(2.0, 0.0, 0.0));
    assert_relative_eq!(mesh.weight(1), 0.5);
    assert_relative_eq!(mesh.delta_coeff(1), 0.5);
    assert_relative_eq!(mesh.correction_vector(1).norm(), 0.0, epsilon = 1e-15);
}

#[test]
fn boundary_geometry() {
    let mesh = Mesh::line(4, 2.0).unwrap();
    let right = mesh.patches()[1].start();

    assert_eq!(mesh.patch_of(right), Some(1));
    assert_eq!(mesh.patch_of(0), None);
    assert_eq!(mesh.far_cell(right), None);
    assert_relative_eq!(mesh.delta(right), Vector::new(1.0, 0.0, 0.0));
    assert_relative_eq!(mesh.weight(right), 1.0);
    assert_relative_eq!(mesh.delta_coeff(right), 1.0);
    assert_eq!(mesh.correction_vector(right), Vector::zeros());
}

#[test]
fn coupled_geometry() {
    let mesh = Mesh::line(4, 1.0).unwrap().couple("left", "right").unwrap();
    let left = mesh.patches()[0].start();
    let right = mesh.patches()[1].start();

    assert_eq!(mesh.partner_face(left), Some(right));
    assert_eq!(mesh.partner_face(right), Some(left));
    assert_eq!(mesh.far_cell(left), Some(3));
    assert_eq!(mesh.far_cell(right), Some(0));

    // The left face sees cell 3 one spacing away, across the periodic seam.
    assert_relative_eq!(mesh.delta(left), Vector::new(-1.0, 0.0, 0.0));
    assert_relative_eq!(mesh.delta(right), Vector::new(1.0, 0.0, 0.0));
    assert_relative_eq!(mesh.weight(left), 0.5);
    assert_relative_eq!(mesh.delta_coeff(left), 1.0);
}

#[test]
fn coupling_errors() {
    let mesh = Mesh::rectangle(2, 3, 1.0, 1.0).unwrap();

    assert_eq!(
        mesh.clone().couple("left", "inlet"),
        Err(MeshError::UnknownPatch("inlet".into()))
    );
    assert_eq!(
        mesh.clone().couple("left", "left"),
        Err(MeshError::SelfCoupled("left".into()))
    );
    assert_eq!(
        mesh.clone().couple("left", "top"),
        Err(MeshError::PatchSizeMismatch {
            a: "left".into(),
            b: "top".into(),
        })
    );

    let coupled = mesh.couple("left", "right").unwrap();
    assert_eq!(
        coupled.couple("right", "left"),
        Err(MeshError::AlreadyCoupled("right".into()))
    );
}

#[test]
fn skewed_face_has_correction_vector() {
    let (cells, mut faces) = closed_pair();
    // Tilt the face normal 45 degrees away from the centre-to-centre line.
    faces[0].area = Vector::new(1.0, 1.0, 0.0);
    let mesh = Mesh::new(cells, faces, vec![]).unwrap();

    let n = mesh.normal(0);
    assert_relative_eq!(mesh.delta_coeff(0), 1.0 / n.x, epsilon = 1e-12);

    // The correction lies in the face plane.
    let k = mesh.correction_vector(0);
    assert_relative_eq!(k.dot(&n), 0.0, epsilon = 1e-12);
    assert_relative_eq!(k, Vector::new(-n.y, n.y, 0.0), epsilon = 1e-12);
}
