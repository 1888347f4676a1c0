//! Scene store: the single source of truth for what exists in the scene
//!
//! The store owns every [`SceneObject`] and the selection. Render-side
//! resources are never held here; consumers diff by id and
//! `geometry_revision`, or drain [`SceneStore::take_changes`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::material::MaterialPatch;
use crate::object::{ObjectId, SceneObject, Transform};

/// Scene store errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("Select an object first")]
    NoSelection,
    #[error("Object not found: {0}")]
    NotFound(ObjectId),
}

/// Structural change notifications for render-side consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneChange {
    Added(ObjectId),
    Removed(ObjectId),
    /// Geometry source changed; render resources must be rebuilt
    Replaced(ObjectId),
}

/// Primary pointer plus multi-set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    primary: Option<ObjectId>,
    members: Vec<ObjectId>,
}

impl Selection {
    pub fn primary(&self) -> Option<&ObjectId> {
        self.primary.as_ref()
    }

    pub fn members(&self) -> &[ObjectId] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.members.contains(id)
    }

    /// Single selection: the multi-set becomes exactly this member
    fn set_one(&mut self, id: ObjectId) {
        self.members = vec![id.clone()];
        self.primary = Some(id);
    }

    /// Multi selection: the primary is set only for exactly one match
    fn set_many(&mut self, ids: Vec<ObjectId>) {
        let mut members: Vec<ObjectId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !members.contains(&id) {
                members.push(id);
            }
        }
        self.primary = if members.len() == 1 {
            members.first().cloned()
        } else {
            None
        };
        self.members = members;
    }

    fn clear(&mut self) {
        self.primary = None;
        self.members.clear();
    }

    fn remove(&mut self, id: &ObjectId) {
        self.members.retain(|m| m != id);
        if self.primary.as_ref() == Some(id) {
            self.primary = None;
        }
    }
}

/// Complete restorable store state (used by undo/redo)
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    objects: Vec<SceneObject>,
    base: Option<ObjectId>,
    base_original: Option<Transform>,
    selection: Selection,
}

/// Serializable transform projection, rotation as XYZ Euler radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformSnapshot {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl From<&Transform> for TransformSnapshot {
    fn from(t: &Transform) -> Self {
        Self {
            position: t.position.to_array(),
            rotation: t.euler().to_array(),
            scale: t.scale.to_array(),
        }
    }
}

/// Read-only summary of one added object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveSnapshot {
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub name: String,
    #[serde(flatten)]
    pub transform: TransformSnapshot,
    pub color: String,
}

/// Read-only projection of root transform, primitive list, and selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    pub root_transform: Option<TransformSnapshot>,
    pub primitives: Vec<PrimitiveSnapshot>,
    pub selected_object: Option<ObjectId>,
    pub selected_objects: Vec<ObjectId>,
}

/// Id-keyed scene store with selection and a structural change log
#[derive(Debug, Default)]
pub struct SceneStore {
    objects: HashMap<ObjectId, SceneObject>,
    /// Insertion order
    order: Vec<ObjectId>,
    base: Option<ObjectId>,
    base_original: Option<Transform>,
    selection: Selection,
    changes: Vec<SceneChange>,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object; a duplicate id is replaced by a fresh one
    pub fn add_object(&mut self, mut object: SceneObject) -> ObjectId {
        if self.objects.contains_key(&object.id) {
            let fresh = ObjectId::generate();
            tracing::debug!("Duplicate object id {}, assigned {}", object.id, fresh);
            object.id = fresh;
        }
        let id = object.id.clone();
        self.order.push(id.clone());
        self.objects.insert(id.clone(), object);
        self.changes.push(SceneChange::Added(id.clone()));
        id
    }

    /// Install the base model and capture its original transform
    ///
    /// Any previous base model is removed.
    pub fn set_base_model(&mut self, object: SceneObject) -> ObjectId {
        if let Some(previous) = self.base.take() {
            self.remove_object(&previous);
        }
        self.base_original = Some(object.transform);
        let id = self.add_object(object);
        self.base = Some(id.clone());
        id
    }

    pub fn base_model(&self) -> Option<&SceneObject> {
        self.base.as_ref().and_then(|id| self.objects.get(id))
    }

    pub fn base_id(&self) -> Option<&ObjectId> {
        self.base.as_ref()
    }

    pub fn is_base(&self, id: &ObjectId) -> bool {
        self.base.as_ref() == Some(id)
    }

    pub fn get(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id)
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Objects in insertion order
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.order.iter().filter_map(|id| self.objects.get(id))
    }

    /// Objects other than the base model
    pub fn added_objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects().filter(|o| !self.is_base(&o.id))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Shallow-merge a material patch; `false` if the id is unknown
    pub fn update_material(&mut self, id: &ObjectId, patch: &MaterialPatch) -> bool {
        match self.objects.get_mut(id) {
            Some(object) => {
                object.material.merge(patch);
                true
            }
            None => false,
        }
    }

    /// Apply a material patch to every selected object
    pub fn apply_material_to_selection(
        &mut self,
        patch: &MaterialPatch,
    ) -> Result<usize, SceneError> {
        if self.selection.is_empty() {
            return Err(SceneError::NoSelection);
        }
        let ids = self.selection.members.clone();
        Ok(ids
            .iter()
            .filter(|id| self.update_material(id, patch))
            .count())
    }

    /// Replace an object's mesh data and report it for rebuild
    pub fn replace_mesh(
        &mut self,
        id: &ObjectId,
        mesh: std::sync::Arc<crate::object::MeshSource>,
    ) -> Result<(), SceneError> {
        let object = self
            .objects
            .get_mut(id)
            .ok_or_else(|| SceneError::NotFound(id.clone()))?;
        object.replace_mesh(mesh);
        self.changes.push(SceneChange::Replaced(id.clone()));
        Ok(())
    }

    /// Attach or clear a scalar overlay
    pub fn set_scalar_field(
        &mut self,
        id: &ObjectId,
        field: Option<crate::scalar_field::ScalarField>,
    ) -> bool {
        let Some(object) = self.objects.get_mut(id) else {
            return false;
        };
        object.set_scalar_field(field);
        self.changes.push(SceneChange::Replaced(id.clone()));
        true
    }

    /// Remove an object, dropping it from the selection
    pub fn remove_object(&mut self, id: &ObjectId) -> Option<SceneObject> {
        let object = self.objects.remove(id)?;
        self.order.retain(|o| o != id);
        self.selection.remove(id);
        if self.base.as_ref() == Some(id) {
            self.base = None;
            self.base_original = None;
        }
        self.changes.push(SceneChange::Removed(id.clone()));
        Some(object)
    }

    /// Drop all added objects, restore the base model's original transform,
    /// clear the selection. Returns the removed objects.
    pub fn reset(&mut self) -> Vec<SceneObject> {
        let added: Vec<ObjectId> = self.added_objects().map(|o| o.id.clone()).collect();
        let removed = added
            .iter()
            .filter_map(|id| self.remove_object(id))
            .collect();
        if let (Some(id), Some(original)) = (self.base.clone(), self.base_original)
            && let Some(base) = self.objects.get_mut(&id)
        {
            base.transform = original;
        }
        self.selection.clear();
        removed
    }

    // ============== Selection ==============

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_object(&self) -> Option<&ObjectId> {
        self.selection.primary()
    }

    pub fn selected_objects(&self) -> &[ObjectId] {
        self.selection.members()
    }

    /// Select one object; unknown ids are ignored (`false`)
    pub fn select(&mut self, id: &ObjectId) -> bool {
        if !self.objects.contains_key(id) {
            return false;
        }
        self.selection.set_one(id.clone());
        true
    }

    /// Replace the selection with the known ids among `ids`
    pub fn select_many(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        let known = ids
            .into_iter()
            .filter(|id| self.objects.contains_key(id))
            .collect();
        self.selection.set_many(known);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected objects, or the base model when nothing is selected
    pub fn targets(&self) -> Vec<ObjectId> {
        if self.selection.is_empty() {
            self.base.iter().cloned().collect()
        } else {
            self.selection.members.clone()
        }
    }

    // ============== Snapshots ==============

    /// Restorable copy of the whole store (mesh payloads are shared)
    pub fn state(&self) -> SceneState {
        SceneState {
            objects: self.objects().cloned().collect(),
            base: self.base.clone(),
            base_original: self.base_original,
            selection: self.selection.clone(),
        }
    }

    /// Restore a captured state's transforms, membership and selection
    ///
    /// Objects that survive the restore keep their live material, shape,
    /// stats and scalar field, since those edits are not recorded in history.
    /// Objects that come back from the snapshot are restored whole.
    pub fn restore(&mut self, state: &SceneState) {
        let incoming: HashSet<&ObjectId> = state.objects.iter().map(|o| &o.id).collect();

        for id in &self.order {
            if !incoming.contains(id) {
                self.changes.push(SceneChange::Removed(id.clone()));
            }
        }

        let mut objects = HashMap::with_capacity(state.objects.len());
        for snapshot in &state.objects {
            let object = match self.objects.remove(&snapshot.id) {
                Some(mut live) => {
                    live.transform = snapshot.transform;
                    live.name = snapshot.name.clone();
                    live
                }
                None => {
                    self.changes.push(SceneChange::Added(snapshot.id.clone()));
                    snapshot.clone()
                }
            };
            objects.insert(snapshot.id.clone(), object);
        }

        self.order = state.objects.iter().map(|o| o.id.clone()).collect();
        self.objects = objects;
        self.base = state.base.clone();
        self.base_original = state.base_original;
        self.selection = state.selection.clone();
    }

    /// Serializable projection for chat/debug attachments
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            root_transform: self.base_model().map(|b| TransformSnapshot::from(&b.transform)),
            primitives: self
                .added_objects()
                .map(|o| PrimitiveSnapshot {
                    id: o.id.clone(),
                    type_tag: o.shape.type_tag(),
                    name: o.name.clone(),
                    transform: TransformSnapshot::from(&o.transform),
                    color: o.material.color.to_hex(),
                })
                .collect(),
            selected_object: self.selection.primary.clone(),
            selected_objects: self.selection.members.clone(),
        }
    }

    /// Drain pending structural changes
    pub fn take_changes(&mut self) -> Vec<SceneChange> {
        std::mem::take(&mut self.changes)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::material::Color;
    use crate::object::Shape;

    fn cube() -> SceneObject {
        SceneObject::new(Shape::Cube { size: 1.0 })
    }

    #[test]
    fn test_duplicate_id_gets_fresh_one() {
        let mut store = SceneStore::new();
        let a = store.add_object(cube().with_id("same"));
        let b = store.add_object(cube().with_id("same"));
        assert_eq!(a.as_str(), "same");
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_update_material_unknown_id() {
        let mut store = SceneStore::new();
        assert!(!store.update_material(&"nope".into(), &MaterialPatch::default()));
    }

    #[test]
    fn test_material_merge_idempotent() {
        let mut store = SceneStore::new();
        let id = store.add_object(cube());
        let patch = MaterialPatch::color(Color::from_hex("#111").unwrap());
        store.update_material(&id, &patch);
        let once = store.get(&id).unwrap().material.clone();
        store.update_material(&id, &patch);
        assert_eq!(store.get(&id).unwrap().material, once);
        assert_eq!(once.roughness, crate::material::Material::default().roughness);
    }

    #[test]
    fn test_apply_material_requires_selection() {
        let mut store = SceneStore::new();
        store.add_object(cube());
        let err = store
            .apply_material_to_selection(&MaterialPatch::default())
            .unwrap_err();
        assert_eq!(err, SceneError::NoSelection);
        assert_eq!(err.to_string(), "Select an object first");
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut store = SceneStore::new();
        let id = store.add_object(cube());
        store.select(&id);
        store.remove_object(&id);
        assert!(store.selected_object().is_none());
        assert!(store.selected_objects().is_empty());
        assert!(store.remove_object(&id).is_none());
    }

    #[test]
    fn test_select_many_primary_only_for_single_match() {
        let mut store = SceneStore::new();
        let a = store.add_object(cube());
        let b = store.add_object(cube());
        store.select_many([a.clone(), b.clone()]);
        assert!(store.selected_object().is_none());
        assert_eq!(store.selected_objects().len(), 2);

        store.select_many([b.clone(), "ghost".into()]);
        assert_eq!(store.selected_object(), Some(&b));
        assert_eq!(store.selected_objects(), &[b]);
    }

    #[test]
    fn test_reset_restores_base_and_drops_added() {
        let mut store = SceneStore::new();
        let base = store.set_base_model(
            SceneObject::new(Shape::Mesh {
                source: None,
                mesh: None,
            })
            .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, 1.0))),
        );
        let added = store.add_object(cube());
        store.get_mut(&base).unwrap().transform.position = Vec3::new(5.0, 5.0, 5.0);
        store.select(&added);

        let removed = store.reset();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, added);
        assert_eq!(
            store.get(&base).unwrap().transform.position,
            Vec3::new(0.0, 0.0, 1.0)
        );
        assert!(store.selection().is_empty());
        assert!(store.snapshot().primitives.is_empty());
    }

    #[test]
    fn test_restore_reports_structural_diff() {
        let mut store = SceneStore::new();
        let a = store.add_object(cube());
        let state = store.state();
        store.take_changes();

        let b = store.add_object(cube());
        store.remove_object(&a);
        store.take_changes();

        store.restore(&state);
        let changes = store.take_changes();
        assert!(changes.contains(&SceneChange::Removed(b.clone())));
        assert!(changes.contains(&SceneChange::Added(a.clone())));
        assert!(store.contains(&a));
        assert!(!store.contains(&b));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut store = SceneStore::new();
        let id = store.add_object(cube());
        store.select(&id);
        let json = serde_json::to_value(store.snapshot()).unwrap();
        assert_eq!(json["primitives"][0]["type"], "cube");
        assert_eq!(json["selectedObject"], id.as_str());
        assert!(json["primitives"][0]["position"].is_array());
    }
}
