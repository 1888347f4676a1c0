//! End-to-end editing workflows over the GPU-free core

use approx::assert_relative_eq;
use glam::Vec3;
use studio_core::io::{MeshFormat, export_stl, import_bytes, import_path};
use studio_core::{
    MeshSource, Modification, ModificationKind, PrimitiveKind, PrimitiveSpec, SceneEditor,
    SceneObject, Shape, Transform, parse_command,
};

fn base_model() -> SceneObject {
    let mesh = MeshSource::new(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
    );
    SceneObject::new(Shape::Mesh {
        source: Some("tetra.stl".into()),
        mesh: Some(mesh.into()),
    })
    .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, 0.5)))
}

#[test]
fn add_translate_export_reset() {
    let mut editor = SceneEditor::new();
    let base = editor.load_base_model(base_model());

    editor.apply(Modification::new(ModificationKind::AddPrimitive(
        PrimitiveSpec::new(PrimitiveKind::Cube),
    )));
    let cube = editor.store().selected_object().cloned().unwrap();
    editor.apply(Modification::new(ModificationKind::Translate {
        x: 1.0,
        y: 0.0,
        z: 0.0,
    }));
    assert_relative_eq!(editor.store().get(&cube).unwrap().transform.position.x, 1.0);

    let bytes = export_stl(editor.store().objects()).unwrap();
    let exported = import_bytes(&bytes, MeshFormat::Stl).unwrap();
    let max_x = exported
        .vertices
        .iter()
        .map(|v| v[0])
        .fold(f32::NEG_INFINITY, f32::max);
    // Cube side 4 shifted by +1
    assert_relative_eq!(max_x, 3.0, epsilon = 1e-4);

    editor.apply(Modification::new(ModificationKind::Reset));
    let snapshot = editor.store().snapshot();
    assert!(snapshot.primitives.is_empty());
    assert_eq!(snapshot.root_transform.unwrap().position, [0.0, 0.0, 0.5]);
    assert!(editor.store().contains(&base));
    assert!(snapshot.selected_objects.is_empty());
}

#[test]
fn parsed_commands_drive_the_editor() {
    let mut editor = SceneEditor::new();
    let base = editor.load_base_model(base_model());

    for text in ["scale up", "rotate 180 degrees around z", "add a sphere"] {
        let modification = parse_command(text).unwrap();
        editor.apply(modification);
    }
    let root = editor.store().get(&base).unwrap();
    assert_relative_eq!(root.transform.scale.x, 1.2);
    assert_eq!(editor.store().added_objects().count(), 1);
    assert_eq!(editor.history().len(), 3);

    // Undo everything back to the freshly loaded model
    while editor.undo() {}
    let root = editor.store().get(&base).unwrap();
    assert_relative_eq!(root.transform.scale.x, 1.0);
    assert_eq!(editor.store().added_objects().count(), 0);
    assert_eq!(editor.history().index(), -1);
}

#[test]
fn history_truncates_redo_branch() {
    let mut editor = SceneEditor::new();
    editor.load_base_model(base_model());
    let translate = |x| {
        Modification::new(ModificationKind::Translate { x, y: 0.0, z: 0.0 }).with_description(
            format!("move {x}"),
        )
    };

    editor.apply(translate(1.0));
    editor.apply(translate(2.0));
    editor.apply(translate(3.0));
    assert!(editor.undo());
    editor.apply(translate(4.0));

    let descriptions: Vec<&str> = editor
        .history()
        .modifications()
        .map(|m| m.description.as_str())
        .collect();
    assert_eq!(descriptions, ["move 1", "move 2", "move 4"]);
    assert_eq!(editor.history().index(), 2);
    assert!(!editor.redo());

    let stamps: Vec<u64> = editor.history().modifications().map(|m| m.timestamp).collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn import_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("part.obj");
    std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

    let mesh = import_path(&path).unwrap();
    assert_eq!(mesh.stats().face_count, 1);

    let missing = import_path(dir.path().join("missing.stl")).unwrap_err();
    assert!(matches!(missing, studio_core::io::ImportError::Io(_)));
}
