//! Viewport lifecycle and selection tests against the headless backend

use std::collections::HashSet;

use glam::{Vec2, Vec3};
use studio_core::{Modification, ModificationKind, ObjectId, PrimitiveKind, PrimitiveSpec};
use studio_renderer::{
    RecordingBackend, RendererConfig, SelectionMode, Viewport, ViewportHandle,
};
use web_time::Instant;

fn mount() -> Viewport<RecordingBackend> {
    Viewport::mount(RecordingBackend::new(), RendererConfig::default(), 800, 600)
}

fn add(viewport: &mut Viewport<RecordingBackend>, kind: PrimitiveKind, at: [f32; 3]) -> ObjectId {
    let spec = PrimitiveSpec::new(kind).at(at);
    viewport.apply_modification(Modification::new(ModificationKind::AddPrimitive(spec)));
    viewport.selected_object().expect("added object is selected")
}

fn assert_released_once<T: Copy + Ord + std::hash::Hash + std::fmt::Debug>(
    created: &[T],
    disposed: &[T],
) {
    let unique: HashSet<_> = disposed.iter().collect();
    assert_eq!(unique.len(), disposed.len(), "double dispose: {:?}", disposed);
    let mut created = created.to_vec();
    let mut disposed = disposed.to_vec();
    created.sort();
    disposed.sort();
    assert_eq!(created, disposed);
}

#[test]
fn unmount_releases_every_resource_once() {
    let mut viewport = mount();
    add(&mut viewport, PrimitiveKind::Cube, [0.0; 3]);
    add(&mut viewport, PrimitiveKind::Sphere, [3.0, 0.0, 0.0]);
    viewport.frame(Instant::now()).unwrap();

    // Delete the sphere so one pair is released before unmount
    viewport.apply_modification(Modification::new(ModificationKind::Delete));
    viewport.frame(Instant::now()).unwrap();

    let backend = viewport.unmount().unwrap();
    assert_eq!(backend.created_meshes.len(), 2);
    assert_released_once(&backend.created_meshes, &backend.disposed_meshes);
    assert_released_once(&backend.created_materials, &backend.disposed_materials);
    assert_eq!(backend.live_mesh_count(), 0);
    assert_eq!(backend.live_material_count(), 0);
    assert!(backend.shut_down);

    // Nothing renders after unmount
    assert!(viewport.frame(Instant::now()).is_ok());
    assert!(viewport.unmount().is_none());
}

#[test]
fn box_selection_selects_enclosed_objects() {
    let mut viewport = mount();
    let left = add(&mut viewport, PrimitiveKind::Cube, [-4.0, 0.0, 0.0]);
    let center = add(&mut viewport, PrimitiveKind::Cube, [0.0; 3]);
    let right = add(&mut viewport, PrimitiveKind::Cube, [8.0, 0.0, 0.0]);
    viewport.frame(Instant::now()).unwrap();
    viewport
        .camera_mut()
        .set_view(Vec3::new(0.0, -30.0, 0.0), Vec3::ZERO);

    viewport.set_selection_mode(SelectionMode::BoundingBox);
    assert!(viewport.drag_begin(Vec2::new(250.0, 250.0)));
    viewport.drag_update(Vec2::new(450.0, 350.0));
    assert!(viewport.marquee().is_some());
    let selected: HashSet<_> = viewport
        .drag_end(Vec2::new(450.0, 350.0))
        .into_iter()
        .collect();

    assert_eq!(selected, HashSet::from([left.clone(), center.clone()]));
    let current: HashSet<_> = viewport.selected_objects().into_iter().collect();
    assert_eq!(current, selected);
    assert!(!current.contains(&right));
    assert!(viewport.marquee().is_none());
}

#[test]
fn point_selection_is_exclusive() {
    let mut viewport = mount();
    let left = add(&mut viewport, PrimitiveKind::Cube, [-4.0, 0.0, 0.0]);
    let right = add(&mut viewport, PrimitiveKind::Cube, [4.0, 0.0, 0.0]);
    viewport.frame(Instant::now()).unwrap();
    viewport
        .camera_mut()
        .set_view(Vec3::new(0.0, -30.0, 0.0), Vec3::ZERO);

    viewport.set_selection_mode(SelectionMode::BoundingBox);
    viewport.drag_begin(Vec2::new(100.0, 200.0));
    viewport.drag_end(Vec2::new(700.0, 400.0));
    assert_eq!(viewport.selected_objects().len(), 2);

    viewport.set_selection_mode(SelectionMode::Point);
    let hit = viewport.pointer_click(Vec2::new(304.0, 300.0));
    assert_eq!(hit, Some(left.clone()));
    assert_eq!(viewport.selected_objects(), vec![left]);
    assert!(!viewport.selected_objects().contains(&right));
}

#[test]
fn fit_on_empty_scene_keeps_camera() {
    let mut viewport = mount();
    let before = viewport.camera().clone();
    assert!(!viewport.fit_scene());
    assert!(!viewport.zoom_to_fit());
    assert!(!viewport.zoom_to_selection());
    assert_eq!(viewport.camera(), &before);
}

#[test]
fn frame_draws_each_object_once() {
    let mut viewport = mount();
    add(&mut viewport, PrimitiveKind::Cylinder, [0.0; 3]);
    add(&mut viewport, PrimitiveKind::Torus, [2.0, 0.0, 0.0]);
    viewport.frame(Instant::now()).unwrap();
    viewport.frame(Instant::now()).unwrap();

    let backend = viewport.backend().unwrap();
    assert_eq!(backend.frames_rendered, 2);
    assert_eq!(backend.last_items.len(), 2);
    assert_eq!(backend.created_meshes.len(), 2);
}
