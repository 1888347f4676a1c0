//! Modification dispatch over the scene store
//!
//! [`SceneEditor::apply`] is the single mutation entry point: it mutates the
//! store, stamps and records the modification, and reports the view-side
//! effects (camera, selection mode, framing) that only the viewport can carry out.

use glam::{Quat, Vec3};

use crate::constants::MAIN_TARGET;
use crate::geometry::{PrimitiveKind, create_primitive};
use crate::history::History;
use crate::modification::{Modification, ModificationKind, ZoomDirection, now_millis};
use crate::object::{ObjectId, SceneObject, Shape, Transform};
use crate::scene::{SceneState, SceneStore};

/// Requests the GPU-free core cannot perform itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEffect {
    Zoom(ZoomDirection),
    /// `None` toggles box selection, `Some` sets it
    BoxSelect(Option<bool>),
    /// Object count changed; re-frame after the settle delay
    Frame,
}

/// Result of [`SceneEditor::apply`]
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// The stamped modification as recorded in history
    pub modification: Modification,
    pub effects: Vec<ViewEffect>,
}

/// Scene store plus snapshot history
#[derive(Debug)]
pub struct SceneEditor {
    store: SceneStore,
    history: History<SceneState>,
}

impl Default for SceneEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneEditor {
    pub fn new() -> Self {
        Self::with_capacity(crate::constants::DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let store = SceneStore::new();
        let history = History::with_capacity(store.state(), capacity);
        Self { store, history }
    }

    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    /// Direct store access for edits that are not recorded (material
    /// tweaks, remediation results, overlays)
    pub fn store_mut(&mut self) -> &mut SceneStore {
        &mut self.store
    }

    pub fn history(&self) -> &History<SceneState> {
        &self.history
    }

    /// Install a freshly loaded base model; history restarts from here
    pub fn load_base_model(&mut self, object: SceneObject) -> ObjectId {
        let id = self.store.set_base_model(object);
        self.history.clear(self.store.state());
        id
    }

    /// Apply a modification stamped with the current wall clock
    pub fn apply(&mut self, modification: Modification) -> Applied {
        self.apply_at(modification, now_millis())
    }

    /// Apply a modification with an explicit timestamp source
    pub fn apply_at(&mut self, mut modification: Modification, now_ms: u64) -> Applied {
        let count_before = self.store.len();
        let mut effects = self.dispatch(&modification.kind);
        if self.store.len() != count_before {
            effects.push(ViewEffect::Frame);
        }

        modification.timestamp = self.history.stamp(now_ms);
        if modification.description.is_empty() {
            modification.description = modification.kind.describe();
        }
        self.history.push(modification.clone(), self.store.state());

        tracing::debug!(
            "Applied {} (history {}/{})",
            modification.type_name(),
            self.history.index(),
            self.history.len()
        );
        Applied {
            modification,
            effects,
        }
    }

    fn dispatch(&mut self, kind: &ModificationKind) -> Vec<ViewEffect> {
        match kind {
            ModificationKind::Translate { x, y, z } => {
                let delta = Vec3::new(*x, *y, *z);
                self.for_each_target(|t| t.position += delta);
            }
            ModificationKind::Rotate { axis, angle } => {
                let rotation = Quat::from_axis_angle(axis.unit(), *angle);
                self.for_each_target(|t| t.rotation = (rotation * t.rotation).normalize());
            }
            ModificationKind::Scale { factor } => {
                if factor.is_finite() && *factor > 0.0 {
                    self.for_each_target(|t| t.scale *= *factor);
                } else {
                    tracing::warn!("Ignoring scale factor {}", factor);
                }
            }
            ModificationKind::AddPrimitive(spec) => {
                let shape = Shape::from_spec(spec);
                if create_primitive(spec).is_none() {
                    tracing::warn!("No geometry for '{}', adding fallback box", spec.kind);
                }
                let mut object = SceneObject::new(shape);
                if let Some(id) = &spec.id {
                    object = object.with_id(id.as_str());
                }
                if let Some(position) = spec.position {
                    object.transform = Transform::from_position(Vec3::from(position));
                }
                if let PrimitiveKind::Other(tag) = &spec.kind {
                    object.name = tag.clone();
                }
                let id = self.store.add_object(object);
                self.store.select(&id);
            }
            ModificationKind::Delete => {
                let doomed: Vec<ObjectId> = self
                    .store
                    .selected_objects()
                    .iter()
                    .filter(|id| !self.store.is_base(id))
                    .cloned()
                    .collect();
                for id in doomed {
                    self.store.remove_object(&id);
                }
            }
            ModificationKind::Reset => {
                self.store.reset();
            }
            ModificationKind::Select { target } => {
                let id = if target.eq_ignore_ascii_case(MAIN_TARGET) {
                    self.store.base_id().cloned()
                } else {
                    Some(ObjectId::from(target.as_str()))
                };
                if !id.is_some_and(|id| self.store.select(&id)) {
                    tracing::debug!("Select target '{}' not found", target);
                }
            }
            ModificationKind::Zoom { direction } => return vec![ViewEffect::Zoom(*direction)],
            ModificationKind::BoundingBoxSelect { enabled } => {
                return vec![ViewEffect::BoxSelect(*enabled)];
            }
            ModificationKind::Boolean { .. }
            | ModificationKind::Extrude { .. }
            | ModificationKind::Chamfer { .. } => {
                // Geometry comes back from the remote service via replace_mesh
                tracing::debug!("Recorded {} for the remote service", kind.type_name());
            }
        }
        Vec::new()
    }

    fn for_each_target(&mut self, mut f: impl FnMut(&mut Transform)) {
        let targets = self.store.targets();
        if targets.is_empty() {
            tracing::debug!("No selection and no base model, nothing to transform");
            return;
        }
        for id in targets {
            if let Some(object) = self.store.get_mut(&id) {
                f(&mut object.transform);
            }
        }
    }

    /// Restore the state before the current entry
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(state) => {
                let state = state.clone();
                self.store.restore(&state);
                true
            }
            None => false,
        }
    }

    /// Restore the state after the next entry
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(state) => {
                let state = state.clone();
                self.store.restore(&state);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::PrimitiveSpec;
    use crate::modification::Axis;

    fn add_cube() -> Modification {
        Modification::new(ModificationKind::AddPrimitive(PrimitiveSpec::new(
            PrimitiveKind::Cube,
        )))
    }

    fn translate(x: f32) -> Modification {
        Modification::new(ModificationKind::Translate { x, y: 0.0, z: 0.0 })
    }

    fn editor_with_base() -> (SceneEditor, ObjectId) {
        let mut editor = SceneEditor::new();
        let base = editor.load_base_model(SceneObject::new(Shape::Urdf {
            source: "robot.urdf".into(),
            mesh: None,
        }));
        (editor, base)
    }

    #[test]
    fn test_add_primitive_selects_it() {
        let mut editor = SceneEditor::new();
        let applied = editor.apply(add_cube());
        let selected = editor.store().selected_object().cloned().unwrap();
        assert_eq!(
            editor.store().get(&selected).unwrap().shape,
            Shape::Cube { size: 4.0 }
        );
        assert!(applied.effects.contains(&ViewEffect::Frame));
    }

    #[test]
    fn test_translate_targets_base_without_selection() {
        let (mut editor, base) = editor_with_base();
        editor.apply(translate(2.0));
        assert_relative_eq!(editor.store().get(&base).unwrap().transform.position.x, 2.0);
    }

    #[test]
    fn test_rotate_about_world_axis() {
        let (mut editor, base) = editor_with_base();
        editor.apply(Modification::new(ModificationKind::Rotate {
            axis: Axis::Z,
            angle: std::f32::consts::FRAC_PI_2,
        }));
        let euler = editor.store().get(&base).unwrap().transform.euler();
        assert_relative_eq!(euler.z, std::f32::consts::FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn test_delete_spares_base_model() {
        let (mut editor, base) = editor_with_base();
        editor.apply(add_cube());
        let cube = editor.store().selected_object().cloned().unwrap();
        editor.store_mut().select_many([base.clone(), cube.clone()]);
        editor.apply(Modification::new(ModificationKind::Delete));
        assert!(editor.store().contains(&base));
        assert!(!editor.store().contains(&cube));
    }

    #[test]
    fn test_select_main() {
        let (mut editor, base) = editor_with_base();
        editor.apply(Modification::new(ModificationKind::Select {
            target: "main".into(),
        }));
        assert_eq!(editor.store().selected_object(), Some(&base));
    }

    #[test]
    fn test_zoom_is_a_view_effect() {
        let mut editor = SceneEditor::new();
        let applied = editor.apply(Modification::new(ModificationKind::Zoom {
            direction: ZoomDirection::In,
        }));
        assert_eq!(applied.effects, vec![ViewEffect::Zoom(ZoomDirection::In)]);
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_undo_restores_transforms() {
        let (mut editor, base) = editor_with_base();
        editor.apply(translate(1.0));
        editor.apply(translate(1.0));
        assert!(editor.undo());
        assert_relative_eq!(editor.store().get(&base).unwrap().transform.position.x, 1.0);
        assert!(editor.undo());
        assert_relative_eq!(editor.store().get(&base).unwrap().transform.position.x, 0.0);
        assert!(!editor.undo());
        assert!(editor.redo());
        assert_relative_eq!(editor.store().get(&base).unwrap().transform.position.x, 1.0);
    }

    #[test]
    fn test_undo_keeps_unrecorded_material_edit() {
        let (mut editor, base) = editor_with_base();
        editor.apply(translate(1.0));
        let red = crate::material::Color::from_hex("#ff0000").unwrap();
        let patch = crate::material::MaterialPatch::color(red);
        assert!(editor.store_mut().update_material(&base, &patch));
        editor.apply(translate(1.0));

        assert!(editor.undo());
        let object = editor.store().get(&base).unwrap();
        assert_relative_eq!(object.transform.position.x, 1.0);
        assert_eq!(object.material.color.to_hex(), "#ff0000");

        assert!(editor.undo());
        assert_eq!(editor.store().get(&base).unwrap().material.color.to_hex(), "#ff0000");

        assert!(editor.redo());
        assert!(editor.redo());
        let object = editor.store().get(&base).unwrap();
        assert_relative_eq!(object.transform.position.x, 2.0);
        assert_eq!(object.material.color.to_hex(), "#ff0000");
    }

    #[test]
    fn test_undo_keeps_replaced_mesh() {
        let (mut editor, base) = editor_with_base();
        editor.apply(translate(1.0));
        let mesh = std::sync::Arc::new(crate::object::MeshSource::new(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0, 1, 2]],
        ));
        editor.store_mut().replace_mesh(&base, mesh).unwrap();
        let revision = editor.store().get(&base).unwrap().geometry_revision;
        editor.store_mut().take_changes();

        assert!(editor.undo());
        let object = editor.store().get(&base).unwrap();
        assert_relative_eq!(object.transform.position.x, 0.0);
        assert_eq!(object.geometry_revision, revision);
        assert!(editor.store_mut().take_changes().is_empty());
    }

    #[test]
    fn test_undo_add_removes_object() {
        let mut editor = SceneEditor::new();
        editor.apply(add_cube());
        editor.store_mut().take_changes();
        assert!(editor.undo());
        assert!(editor.store().is_empty());
        let changes = editor.store_mut().take_changes();
        assert!(matches!(changes[..], [crate::scene::SceneChange::Removed(_)]));
    }

    #[test]
    fn test_timestamps_non_decreasing() {
        let mut editor = SceneEditor::new();
        let a = editor.apply_at(translate(1.0), 500);
        let b = editor.apply_at(translate(1.0), 100);
        assert_eq!(a.modification.timestamp, 500);
        assert_eq!(b.modification.timestamp, 500);
    }
}
