//! Viewport controller
//!
//! [`Viewport`] ties the scene editor to a render backend for the lifetime of
//! one mounted view: it owns the camera, selection engine, auto-fit timer,
//! resource registry and pending loads, and drives update → sync → render
//! once per frame.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use studio_core::{
    Applied, CommandParser, LoadToken, LoadTracker, MaterialPatch, Modification, ModificationSink,
    ObjectId, RegexCommandParser, RemediationResult, ScalarField, SceneEditor, SceneError,
    SceneObject, ViewEffect, ZoomDirection,
};
use web_time::Instant;

use crate::autofit::{AutoFit, compute_frame, zoom_to_bounds};
use crate::backend::{CapturedImage, FrameData, RenderBackend, RenderError};
use crate::camera::Camera;
use crate::config::RendererConfig;
use crate::constants::ZOOM_STEP;
use crate::registry::ResourceRegistry;
use crate::scene::BoundingBox;
use crate::selection::{Marquee, Pickable, SelectionEngine, SelectionMode, objects_in_rect, pick};

/// One mounted 3D view over a scene editor
pub struct Viewport<B: RenderBackend> {
    backend: Option<B>,
    config: RendererConfig,
    camera: Camera,
    selection: SelectionEngine,
    autofit: AutoFit,
    registry: ResourceRegistry,
    editor: SceneEditor,
    loads: LoadTracker,
    parser: Box<dyn CommandParser>,
    sink: Option<Arc<dyn ModificationSink>>,
    size: (u32, u32),
}

fn aspect(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

impl<B: RenderBackend> Viewport<B> {
    /// Mount a view over a fresh, empty scene
    pub fn mount(mut backend: B, config: RendererConfig, width: u32, height: u32) -> Self {
        backend.resize(width, height);
        tracing::info!("Viewport mounted ({}x{})", width, height);
        Self {
            backend: Some(backend),
            camera: Camera::from_config(&config.camera, aspect(width, height)),
            selection: SelectionEngine::new(),
            autofit: AutoFit::from_config(&config.autofit),
            registry: ResourceRegistry::new(),
            editor: SceneEditor::with_capacity(config.history_capacity),
            loads: LoadTracker::new(),
            parser: Box::new(RegexCommandParser::new()),
            sink: None,
            size: (width, height),
            config,
        }
    }

    /// Release every resource and stop rendering
    ///
    /// Cancels pending loads, disposes each geometry and material once, and
    /// shuts the backend down. Returns the backend; a second call returns `None`.
    pub fn unmount(&mut self) -> Option<B> {
        let mut backend = self.backend.take()?;
        self.loads.cancel_all();
        self.autofit.cancel();
        self.selection.cancel_drag();
        self.registry.dispose_all(&mut backend);
        backend.shutdown();
        tracing::info!("Viewport unmounted");
        Some(backend)
    }

    /// Whether the view is still mounted
    pub fn is_mounted(&self) -> bool {
        self.backend.is_some()
    }

    /// Forward applied modifications to an external observer
    pub fn set_sink(&mut self, sink: Arc<dyn ModificationSink>) {
        self.sink = Some(sink);
    }

    /// Swap the natural-language command strategy
    pub fn set_command_parser(&mut self, parser: Box<dyn CommandParser>) {
        self.parser = parser;
    }

    /// Backend, while mounted
    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    /// Mutable backend, while mounted
    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    /// Scene editor
    pub fn editor(&self) -> &SceneEditor {
        &self.editor
    }

    /// Active configuration
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Replace the configuration; lens and auto-fit settings apply immediately
    pub fn set_config(&mut self, config: RendererConfig) {
        self.camera.set_fov_degrees(config.camera.fov_degrees);
        self.autofit = AutoFit::from_config(&config.autofit);
        self.config = config;
    }

    /// Camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Render target size in pixels
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Selection engine state
    pub fn selection(&self) -> &SelectionEngine {
        &self.selection
    }

    /// Resize surface and camera together
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == self.size {
            return;
        }
        self.size = (width, height);
        self.camera.update_aspect(aspect(width, height));
        if let Some(backend) = &mut self.backend {
            backend.resize(width, height);
        }
    }

    // ============== Frame loop ==============

    /// Run one update → sync → render cycle
    ///
    /// A no-op once unmounted.
    pub fn frame(&mut self, now: Instant) -> Result<(), RenderError> {
        if !self.is_mounted() {
            return Ok(());
        }
        if self.autofit.poll(now) {
            self.fit_scene();
        }
        self.sync_resources();

        let items = self.registry.draw_items(self.editor.store());
        let Some(backend) = &mut self.backend else {
            return Ok(());
        };
        backend.render(&FrameData {
            camera: &self.camera,
            items: &items,
            config: &self.config,
        })
    }

    /// Render one frame and read it back
    pub fn capture(&mut self) -> Result<CapturedImage, RenderError> {
        self.sync_resources();
        let items = self.registry.draw_items(self.editor.store());
        let Some(backend) = &mut self.backend else {
            return Err(RenderError::ShutDown);
        };
        backend.capture(&FrameData {
            camera: &self.camera,
            items: &items,
            config: &self.config,
        })
    }

    fn sync_resources(&mut self) {
        let changes = self.editor.store_mut().take_changes();
        if let Some(backend) = &mut self.backend {
            self.registry.sync(backend, self.editor.store(), &changes);
        }
    }

    /// Whether an auto-fit is waiting for the settle delay
    pub fn autofit_pending(&self) -> bool {
        self.autofit.is_pending()
    }

    /// Schedule a debounced re-frame
    pub fn request_frame(&mut self, now: Instant) {
        if self.config.autofit.enabled {
            self.autofit.schedule(now);
        }
    }

    // ============== Bounds ==============

    fn object_bounds(&self, object: &SceneObject) -> BoundingBox {
        self.local_bounds(object).transform(&object.model_matrix())
    }

    fn local_bounds(&self, object: &SceneObject) -> BoundingBox {
        match self.registry.geometry(&object.id) {
            Some(geometry) => BoundingBox::from_geometry(geometry),
            None => BoundingBox::from_center_half_extents(
                Vec3::ZERO,
                object.shape.approximate_half_extents(),
            ),
        }
    }

    /// World bounds of the given objects; empty when none resolve
    pub fn bounds_of<'a>(&self, ids: impl IntoIterator<Item = &'a ObjectId>) -> BoundingBox {
        let store = self.editor.store();
        ids.into_iter()
            .filter_map(|id| store.get(id))
            .fold(BoundingBox::empty(), |acc, object| {
                acc.union(&self.object_bounds(object))
            })
    }

    /// World bounds of the whole scene
    pub fn scene_bounds(&self) -> BoundingBox {
        self.editor
            .store()
            .objects()
            .fold(BoundingBox::empty(), |acc, object| {
                acc.union(&self.object_bounds(object))
            })
    }

    /// Frame every object using the auto-fit placement rule
    ///
    /// Leaves the camera untouched for an empty scene without a reference
    /// volume. Returns whether it moved.
    pub fn fit_scene(&mut self) -> bool {
        let store = self.editor.store();
        let bounds: Vec<BoundingBox> = store.objects().map(|o| self.object_bounds(o)).collect();
        match compute_frame(bounds, &self.config.autofit) {
            Some(frame) => {
                self.camera.set_view(frame.position, frame.target);
                tracing::debug!("Auto-fit camera to {:?}", frame.target);
                true
            }
            None => false,
        }
    }

    /// Zoom so the whole scene fills the view
    pub fn zoom_to_fit(&mut self) -> bool {
        let bounds = self.scene_bounds();
        if !bounds.is_valid() {
            return false;
        }
        zoom_to_bounds(&mut self.camera, &bounds)
    }

    /// Zoom so the selection fills the view
    pub fn zoom_to_selection(&mut self) -> bool {
        let ids = self.editor.store().selected_objects().to_vec();
        let bounds = self.bounds_of(&ids);
        if !bounds.is_valid() {
            tracing::debug!("Zoom to selection skipped: nothing selected");
            return false;
        }
        zoom_to_bounds(&mut self.camera, &bounds)
    }

    // ============== Input ==============

    fn pickables(&self) -> Vec<Pickable<'_>> {
        self.editor
            .store()
            .objects()
            .map(|object| Pickable {
                id: &object.id,
                model: object.model_matrix(),
                geometry: self.registry.geometry(&object.id),
                local_bounds: self.local_bounds(object),
            })
            .collect()
    }

    /// Point-select under a pixel; a miss clears the selection
    ///
    /// Ignored in box mode and during a marquee drag.
    pub fn pointer_click(&mut self, pixel: Vec2) -> Option<ObjectId> {
        if !self.selection.accepts_click() {
            return None;
        }
        let (w, h) = self.size;
        let ray = self
            .camera
            .screen_to_ray(pixel.x, pixel.y, w as f32, h as f32);
        let hit = pick(&ray, self.pickables());
        let store = self.editor.store_mut();
        match &hit {
            Some(id) => {
                store.select(id);
            }
            None => store.clear_selection(),
        }
        hit
    }

    /// Start a marquee drag; returns `false` outside box mode
    pub fn drag_begin(&mut self, pixel: Vec2) -> bool {
        self.selection.begin_drag(pixel)
    }

    /// Track the marquee
    pub fn drag_update(&mut self, pixel: Vec2) {
        self.selection.update_drag(pixel);
    }

    /// Current marquee for the overlay
    pub fn marquee(&self) -> Option<Marquee> {
        self.selection.marquee()
    }

    /// Finish the marquee and select the objects it touches
    ///
    /// A zero-area drag leaves the selection unchanged.
    pub fn drag_end(&mut self, pixel: Vec2) -> Vec<ObjectId> {
        let (w, h) = self.size;
        let Some(rect) = self
            .selection
            .end_drag(pixel, Vec2::new(w as f32, h as f32))
        else {
            return Vec::new();
        };
        if !rect.has_area() {
            return Vec::new();
        }
        let ids = objects_in_rect(&self.camera, rect, self.pickables());
        tracing::debug!("Box selection matched {} objects", ids.len());
        self.editor.store_mut().select_many(ids.iter().cloned());
        ids
    }

    /// Switch between point and box selection
    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.selection.set_mode(mode);
    }

    /// Orbit by a pointer delta in pixels
    pub fn orbit(&mut self, delta: Vec2) {
        let sensitivity = self.config.camera.orbit_sensitivity;
        self.camera
            .orbit(-delta.x * sensitivity, delta.y * sensitivity);
    }

    /// Pan by a pointer delta in pixels
    pub fn pan(&mut self, delta: Vec2) {
        self.camera
            .pan(delta.x, delta.y, self.config.camera.pan_sensitivity);
    }

    /// Zoom by a scroll delta
    pub fn scroll_zoom(&mut self, delta: f32) {
        self.camera
            .zoom(delta, self.config.camera.zoom_sensitivity);
    }

    // ============== Modifications ==============

    /// Apply a modification and carry out its view effects
    pub fn apply(&mut self, modification: Modification) -> Applied {
        let applied = self.editor.apply(modification);
        for effect in &applied.effects {
            self.handle_effect(*effect);
        }
        if let Some(sink) = &self.sink
            && let Err(e) = sink.notify(&applied.modification)
        {
            tracing::warn!(
                "Failed to notify backend of {}: {}",
                applied.modification.type_name(),
                e
            );
        }
        applied
    }

    fn handle_effect(&mut self, effect: ViewEffect) {
        match effect {
            ViewEffect::Zoom(ZoomDirection::In) => self.camera.dolly(ZOOM_STEP),
            ViewEffect::Zoom(ZoomDirection::Out) => self.camera.dolly(1.0 / ZOOM_STEP),
            ViewEffect::Zoom(ZoomDirection::Fit) => {
                self.zoom_to_fit();
            }
            ViewEffect::BoxSelect(enabled) => self.selection.set_box_mode(enabled),
            ViewEffect::Frame => self.request_frame(Instant::now()),
        }
    }

    /// Parse a natural-language command with the active strategy
    pub fn parse(&self, text: &str) -> Option<Modification> {
        self.parser.parse(text)
    }

    /// Undo the last modification
    pub fn undo(&mut self) -> bool {
        let count = self.editor.store().len();
        let undone = self.editor.undo();
        if undone && self.editor.store().len() != count {
            self.request_frame(Instant::now());
        }
        undone
    }

    /// Redo the next modification
    pub fn redo(&mut self) -> bool {
        let count = self.editor.store().len();
        let redone = self.editor.redo();
        if redone && self.editor.store().len() != count {
            self.request_frame(Instant::now());
        }
        redone
    }

    // ============== Direct edits ==============

    /// Merge a material patch into one object
    pub fn update_material(&mut self, id: &ObjectId, patch: &MaterialPatch) -> bool {
        self.editor.store_mut().update_material(id, patch)
    }

    /// Merge a material patch into every selected object
    pub fn apply_material_to_selection(
        &mut self,
        patch: &MaterialPatch,
    ) -> Result<usize, SceneError> {
        self.editor.store_mut().apply_material_to_selection(patch)
    }

    /// Swap in a remediated mesh
    pub fn apply_remediation(&mut self, result: RemediationResult) -> Result<(), SceneError> {
        let stats = result.stats();
        let id = result.object_id.clone();
        self.editor
            .store_mut()
            .replace_mesh(&id, Arc::new(result.mesh))?;
        if let Some(object) = self.editor.store_mut().get_mut(&id) {
            object.stats = Some(stats);
        }
        tracing::info!(
            "Remediated {}: {} vertices, {} faces",
            id,
            stats.vertex_count,
            stats.face_count
        );
        Ok(())
    }

    /// Attach or clear a scalar overlay
    pub fn set_scalar_field(&mut self, id: &ObjectId, field: Option<ScalarField>) -> bool {
        self.editor.store_mut().set_scalar_field(id, field)
    }

    // ============== Loads ==============

    /// Start tracking a background load; supersedes any load for `target`
    pub fn begin_load(&mut self, target: &str) -> LoadToken {
        self.loads.begin(target)
    }

    /// Number of loads in flight
    pub fn pending_loads(&self) -> usize {
        self.loads.pending()
    }

    /// Retire a finished load; `false` means its result must be discarded
    pub fn accept_load(&mut self, token: &LoadToken) -> bool {
        if !self.is_mounted() || !self.loads.finish(token) {
            tracing::debug!("Discarding result of cancelled load '{}'", token.target());
            return false;
        }
        true
    }

    /// Install a loaded base model unless its load was cancelled
    pub fn finish_load(&mut self, token: &LoadToken, object: SceneObject) -> Option<ObjectId> {
        if !self.accept_load(token) {
            return None;
        }
        Some(self.load_base_model(object))
    }

    /// Replace the base model and re-frame
    pub fn load_base_model(&mut self, object: SceneObject) -> ObjectId {
        let id = self.editor.load_base_model(object);
        tracing::info!("Loaded base model {}", id);
        self.request_frame(Instant::now());
        id
    }
}

impl<B: RenderBackend> Drop for Viewport<B> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use studio_core::{ModificationKind, PrimitiveKind, PrimitiveSpec};

    use super::*;
    use crate::backend::RecordingBackend;

    fn viewport() -> Viewport<RecordingBackend> {
        Viewport::mount(RecordingBackend::new(), RendererConfig::default(), 800, 600)
    }

    fn add(viewport: &mut Viewport<RecordingBackend>, kind: PrimitiveKind, at: [f32; 3]) -> ObjectId {
        viewport.apply(Modification::new(ModificationKind::AddPrimitive(
            PrimitiveSpec::new(kind).at(at),
        )));
        viewport.editor().store().selected_object().cloned().unwrap()
    }

    #[test]
    fn test_zoom_effects_move_camera() {
        let mut viewport = viewport();
        let before = viewport.camera().distance;
        viewport.apply(Modification::new(ModificationKind::Zoom {
            direction: ZoomDirection::In,
        }));
        assert!(viewport.camera().distance < before);
    }

    #[test]
    fn test_add_schedules_autofit() {
        let mut viewport = viewport();
        add(&mut viewport, PrimitiveKind::Cube, [0.0; 3]);
        assert!(viewport.autofit_pending());
        let later = Instant::now() + Duration::from_secs(1);
        viewport.frame(later).unwrap();
        assert!(!viewport.autofit_pending());
        assert_eq!(viewport.camera().target, Vec3::ZERO);
    }

    #[test]
    fn test_click_selects_and_miss_clears() {
        let mut viewport = viewport();
        let id = add(&mut viewport, PrimitiveKind::Cube, [0.0; 3]);
        viewport.frame(Instant::now()).unwrap();
        viewport.editor.store_mut().clear_selection();

        viewport.camera_mut().set_view(Vec3::new(0.0, -20.0, 0.0), Vec3::ZERO);
        assert_eq!(viewport.pointer_click(Vec2::new(400.0, 300.0)), Some(id.clone()));
        assert_eq!(viewport.editor().store().selected_object(), Some(&id));

        assert_eq!(viewport.pointer_click(Vec2::new(2.0, 2.0)), None);
        assert!(viewport.editor().store().selected_objects().is_empty());
    }

    #[test]
    fn test_box_mode_suppresses_clicks() {
        let mut viewport = viewport();
        add(&mut viewport, PrimitiveKind::Cube, [0.0; 3]);
        viewport.apply(Modification::new(ModificationKind::BoundingBoxSelect {
            enabled: Some(true),
        }));
        viewport.editor.store_mut().clear_selection();
        viewport.camera_mut().set_view(Vec3::new(0.0, -20.0, 0.0), Vec3::ZERO);
        assert_eq!(viewport.pointer_click(Vec2::new(400.0, 300.0)), None);
        assert!(viewport.editor().store().selected_objects().is_empty());
    }

    #[test]
    fn test_cancelled_load_is_discarded() {
        let mut viewport = viewport();
        let first = viewport.begin_load("model");
        let second = viewport.begin_load("model");
        assert!(first.is_cancelled());
        let object = SceneObject::new(studio_core::Shape::Cube { size: 1.0 });
        assert!(viewport.finish_load(&first, object.clone()).is_none());
        assert!(viewport.finish_load(&second, object).is_some());
        assert_eq!(viewport.pending_loads(), 0);
    }

    #[test]
    fn test_unmount_twice() {
        let mut viewport = viewport();
        assert!(viewport.unmount().is_some());
        assert!(viewport.unmount().is_none());
        assert!(viewport.frame(Instant::now()).is_ok());
    }
}
