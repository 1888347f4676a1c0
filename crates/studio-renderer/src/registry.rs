//! Render resource registry
//!
//! Maps scene object ids to backend handles. The scene store stays free of
//! GPU state; each frame the registry diffs the store against what has been
//! uploaded and issues the minimal create / update / dispose calls.

use std::collections::HashMap;
use std::sync::Arc;

use studio_core::{Geometry, Material, ObjectId, SceneChange, SceneObject, SceneStore};

use crate::backend::{DrawItem, InstanceData, MaterialHandle, MeshHandle, MeshUpload, RenderBackend};

#[derive(Debug)]
struct Entry {
    mesh: MeshHandle,
    material: MaterialHandle,
    revision: u64,
    material_state: Material,
    instance: InstanceData,
    geometry: Arc<Geometry>,
}

/// Object id → backend resources
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    entries: HashMap<ObjectId, Entry>,
    /// Objects whose upload failed, by geometry revision; retried when it changes
    failed: HashMap<ObjectId, u64>,
}

fn instance_for(object: &SceneObject, store: &SceneStore) -> InstanceData {
    InstanceData {
        model: object.model_matrix(),
        selected: store.selection().contains(&object.id),
    }
}

fn upload<B: RenderBackend + ?Sized>(
    backend: &mut B,
    object: &SceneObject,
    geometry: &Geometry,
) -> Option<MeshHandle> {
    let vertex_colors = object
        .scalar_field
        .as_ref()
        .and_then(|field| field.vertex_colors(geometry.vertex_count()));
    let upload = MeshUpload {
        label: object.id.as_str(),
        geometry,
        vertex_colors: vertex_colors.as_deref(),
    };
    match backend.create_mesh(&upload) {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!("Failed to upload mesh for {}: {}", object.id, e);
            None
        }
    }
}

impl ResourceRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects with live resources
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no resources are held
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Uploaded object-space geometry of an object
    pub fn geometry(&self, id: &ObjectId) -> Option<&Geometry> {
        self.entries.get(id).map(|e| e.geometry.as_ref())
    }

    /// Bring backend resources in line with the store
    ///
    /// `changes` are the structural changes drained from the store since the
    /// previous sync; `Replaced` forces a geometry rebuild even when the
    /// revision matches.
    pub fn sync<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        store: &SceneStore,
        changes: &[SceneChange],
    ) {
        let stale: Vec<ObjectId> = self
            .entries
            .keys()
            .filter(|id| !store.contains(id))
            .cloned()
            .collect();
        for id in stale {
            self.dispose(backend, &id);
        }
        self.failed.retain(|id, _| store.contains(id));

        for change in changes {
            if let SceneChange::Replaced(id) = change
                && let Some(entry) = self.entries.get_mut(id)
            {
                // Revision 0 is never issued, so the next pass rebuilds
                entry.revision = 0;
            }
        }

        for object in store.objects() {
            let instance = instance_for(object, store);
            match self.entries.get_mut(&object.id) {
                Some(entry) if entry.revision == object.geometry_revision => {
                    if entry.material_state != object.material {
                        backend.update_material(entry.material, &object.material);
                        entry.material_state = object.material.clone();
                    }
                    if entry.instance != instance {
                        backend.update_instance(entry.mesh, &instance);
                        entry.instance = instance;
                    }
                }
                Some(entry) => {
                    let geometry = Arc::new(object.geometry());
                    backend.dispose_mesh(entry.mesh);
                    match upload(backend, object, &geometry) {
                        Some(mesh) => {
                            tracing::debug!("Rebuilt geometry for {}", object.id);
                            backend.update_instance(mesh, &instance);
                            if entry.material_state != object.material {
                                backend.update_material(entry.material, &object.material);
                                entry.material_state = object.material.clone();
                            }
                            entry.mesh = mesh;
                            entry.geometry = geometry;
                            entry.revision = object.geometry_revision;
                            entry.instance = instance;
                        }
                        None => {
                            backend.dispose_material(entry.material);
                            self.entries.remove(&object.id);
                            self.failed
                                .insert(object.id.clone(), object.geometry_revision);
                        }
                    }
                }
                None => {
                    if self.failed.get(&object.id) == Some(&object.geometry_revision) {
                        continue;
                    }
                    let geometry = Arc::new(object.geometry());
                    let Some(mesh) = upload(backend, object, &geometry) else {
                        self.failed
                            .insert(object.id.clone(), object.geometry_revision);
                        continue;
                    };
                    self.failed.remove(&object.id);
                    let material = backend.create_material(&object.material);
                    backend.update_instance(mesh, &instance);
                    self.entries.insert(
                        object.id.clone(),
                        Entry {
                            mesh,
                            material,
                            revision: object.geometry_revision,
                            material_state: object.material.clone(),
                            instance,
                            geometry,
                        },
                    );
                }
            }
        }
    }

    fn dispose<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, id: &ObjectId) {
        if let Some(entry) = self.entries.remove(id) {
            backend.dispose_mesh(entry.mesh);
            backend.dispose_material(entry.material);
        }
    }

    /// Release every held resource exactly once
    pub fn dispose_all<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        let count = self.entries.len();
        for (_, entry) in self.entries.drain() {
            backend.dispose_mesh(entry.mesh);
            backend.dispose_material(entry.material);
        }
        self.failed.clear();
        if count > 0 {
            tracing::debug!("Disposed resources of {} objects", count);
        }
    }

    /// Draw list in scene order
    pub fn draw_items(&self, store: &SceneStore) -> Vec<DrawItem> {
        store
            .objects()
            .filter_map(|object| self.entries.get(&object.id))
            .map(|entry| DrawItem {
                mesh: entry.mesh,
                material: entry.material,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use studio_core::{Color, MaterialPatch, SceneObject, Shape};

    use super::*;
    use crate::backend::RecordingBackend;

    fn store_with_cube() -> (SceneStore, ObjectId) {
        let mut store = SceneStore::new();
        let id = store.add_object(SceneObject::new(Shape::Cube { size: 1.0 }));
        (store, id)
    }

    #[test]
    fn test_sync_creates_once() {
        let (mut store, _) = store_with_cube();
        let mut backend = RecordingBackend::new();
        let mut registry = ResourceRegistry::new();
        let changes = store.take_changes();
        registry.sync(&mut backend, &store, &changes);
        registry.sync(&mut backend, &store, &[]);
        assert_eq!(backend.created_meshes.len(), 1);
        assert_eq!(backend.created_materials.len(), 1);
        assert_eq!(registry.draw_items(&store).len(), 1);
    }

    #[test]
    fn test_material_and_selection_updates() {
        let (mut store, id) = store_with_cube();
        let mut backend = RecordingBackend::new();
        let mut registry = ResourceRegistry::new();
        registry.sync(&mut backend, &store, &[]);

        store.update_material(&id, &MaterialPatch::color(Color::rgb(1.0, 0.0, 0.0)));
        store.select(&id);
        registry.sync(&mut backend, &store, &[]);

        let item = registry.draw_items(&store)[0];
        assert_eq!(
            backend.material(item.material).unwrap().color,
            Color::rgb(1.0, 0.0, 0.0)
        );
        assert!(backend.instance(item.mesh).unwrap().selected);
        assert_eq!(backend.created_meshes.len(), 1);
    }

    #[test]
    fn test_replaced_geometry_rebuilds_mesh_only() {
        let (mut store, id) = store_with_cube();
        let mut backend = RecordingBackend::new();
        let mut registry = ResourceRegistry::new();
        let changes = store.take_changes();
        registry.sync(&mut backend, &store, &changes);

        let mesh = studio_core::MeshSource::new(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0, 1, 2]],
        );
        store.replace_mesh(&id, Arc::new(mesh)).unwrap();
        let changes = store.take_changes();
        registry.sync(&mut backend, &store, &changes);

        assert_eq!(backend.created_meshes.len(), 2);
        assert_eq!(backend.disposed_meshes.len(), 1);
        assert_eq!(backend.created_materials.len(), 1);
        assert_eq!(registry.geometry(&id).unwrap().triangle_count(), 1);
    }

    #[test]
    fn test_removed_objects_disposed() {
        let (mut store, id) = store_with_cube();
        let mut backend = RecordingBackend::new();
        let mut registry = ResourceRegistry::new();
        registry.sync(&mut backend, &store, &[]);
        store.remove_object(&id);
        let changes = store.take_changes();
        registry.sync(&mut backend, &store, &changes);
        assert!(registry.is_empty());
        assert_eq!(backend.live_mesh_count(), 0);
        assert_eq!(backend.live_material_count(), 0);
        registry.dispose_all(&mut backend);
        assert_eq!(backend.disposed_meshes.len(), 1);
    }
}
