use std::io::Write;

use augment_core::shapes::star_coordinates;
use augment_core::transform::{compose_homogeneous, rotate_x, rotate_z};
use augment_core::{Error, Mat3, ModelKind, ModelTag, ObjectModel, PatternSize, Pt3};

const CUBE_CORNER: &str = "\
o corner
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
f 1//1 2//1 3//1
";

fn write_mesh(src: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(src.as_bytes()).unwrap();
    file
}

#[test]
fn upright_mesh_stands_on_pattern_plane() {
    let file = write_mesh(CUBE_CORNER);
    let model = ObjectModel::upright_mesh(file.path(), 5.0).unwrap();
    assert_eq!(model.tag(), ModelTag::Mesh);

    // Y-up in the file becomes -Z (towards the camera side) on the pattern.
    let top = model.vertices()[2];
    assert!((top - Pt3::new(0.0, 0.0, -5.0)).norm() < 1e-12, "{top}");
    let side = model.vertices()[1];
    assert!((side - Pt3::new(5.0, 0.0, 0.0)).norm() < 1e-12, "{side}");
}

#[test]
fn mesh_faces_survive_transforms() {
    let file = write_mesh(CUBE_CORNER);
    let mut model = ObjectModel::mesh_from_path(file.path()).unwrap();
    model.apply_linear(&rotate_z(0.1));
    model.apply_linear(&rotate_z(0.1));
    let ModelKind::Mesh { faces } = &model.kind else {
        panic!("expected a mesh");
    };
    assert_eq!(faces, &vec![[1, 2, 3]]);
    // Nudges compose: two 0.1 rad turns equal one 0.2 rad turn.
    let expected = rotate_z(0.2) * Pt3::new(1.0, 0.0, 0.0).coords;
    assert!((model.vertices()[1].coords - expected).norm() < 1e-12);
}

#[test]
fn truncated_face_keeps_previous_model() {
    let file = write_mesh("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//1 2//1 3\n");
    let mut model = ObjectModel::corner_markers(&PatternSize::default()).unwrap();
    let before = model.clone();
    let err = model.load_mesh(file.path()).unwrap_err();
    assert!(matches!(err, Error::ParseError { line: 4, .. }), "{err}");
    assert_eq!(model, before);
}

#[test]
fn star_pair_matches_star_coordinates() {
    let bl = Pt3::new(1.2, -3.0, 0.0);
    let model = ObjectModel::star_pair(2.0, bl, 45.0);
    let [first, second] = star_coordinates(2.0, bl, 45.0);
    assert_eq!(&model.vertices()[..3], &first);
    assert_eq!(&model.vertices()[3..], &second);
}

#[test]
fn homogeneous_compose_then_apply() {
    let mut model = ObjectModel::axis_markers();
    let h = compose_homogeneous(&rotate_x(0.0), &[0.5, 0.5, 0.0], 1.0).unwrap();
    model.apply_homogeneous(&h);
    assert_eq!(model.vertices()[0], Pt3::new(0.5, 0.5, 0.0));
    model.apply_linear(&Mat3::identity());
    assert_eq!(model.vertices()[3], Pt3::new(0.5, 0.5, -1.0));
}
