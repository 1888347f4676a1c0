//! Imperative control surface for embedding the viewport
//!
//! Chat panels, toolbars and other collaborators drive the view only through
//! [`ViewportHandle`]; they never reach into the scene store directly.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use studio_core::io::{ExportError, export_obj, export_stl};
use studio_core::{Modification, ModificationKind, ObjectId, SceneSnapshot};

use crate::backend::{RenderBackend, RenderError};
use crate::capture::{CaptureError, to_png_data_url};
use crate::viewport::Viewport;

/// Externally settable camera state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewpoint {
    /// Eye position
    pub position: [f32; 3],
    /// Look-at point
    pub target: [f32; 3],
    /// Vertical field of view; keeps the current one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fov_degrees: Option<f32>,
}

/// Per-object export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Binary STL
    Stl,
    /// Wavefront OBJ
    Obj,
}

impl ExportFormat {
    /// Every supported format
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Stl, ExportFormat::Obj];

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Stl => "stl",
            ExportFormat::Obj => "obj",
        }
    }
}

/// Handle errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewportError {
    /// The view has been unmounted
    #[error("Viewport is not mounted")]
    NotMounted,
    /// Backend failure
    #[error(transparent)]
    Render(#[from] RenderError),
    /// Screenshot encoding failure
    #[error(transparent)]
    Capture(#[from] CaptureError),
    /// Mesh export failure
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Imperative viewport API
pub trait ViewportHandle {
    /// Move the camera; a no-op when not mounted
    fn set_view(&mut self, viewpoint: Viewpoint);

    /// Resize the render surface
    fn set_size(&mut self, width: u32, height: u32);

    /// Render the current view as a `data:image/png;base64,...` URL
    fn capture_image(&mut self) -> Result<String, ViewportError>;

    /// Apply and record a modification, returning it as stamped in history
    ///
    /// Observers are notified best-effort; a failed notification never rolls
    /// the change back.
    fn apply_modification(&mut self, modification: Modification) -> Modification;

    /// Binary STL of every object in world space
    fn export_stl(&self) -> Result<Vec<u8>, ViewportError>;

    /// Binary STL of the selected objects
    fn export_selection_stl(&self) -> Result<Vec<u8>, ViewportError>;

    /// One object in the requested format
    fn export_to_format(&self, id: &ObjectId, format: ExportFormat)
    -> Result<Vec<u8>, ViewportError>;

    /// Serializable scene summary
    fn scene_state(&self) -> SceneSnapshot;

    /// Restore the base model and drop added objects (recorded in history)
    fn reset_model(&mut self) -> Modification;

    /// Step back in history
    fn undo(&mut self) -> bool;

    /// Step forward in history
    fn redo(&mut self) -> bool;

    /// Primary selection
    fn selected_object(&self) -> Option<ObjectId>;

    /// Whole selection
    fn selected_objects(&self) -> Vec<ObjectId>;

    /// Frame the selection
    fn zoom_to_selection(&mut self) -> bool;

    /// Frame the whole scene
    fn zoom_to_fit(&mut self) -> bool;

    /// Turn free text into a modification, if it matches a known command
    fn parse_command(&self, text: &str) -> Option<Modification>;
}

impl<B: RenderBackend> ViewportHandle for Viewport<B> {
    fn set_view(&mut self, viewpoint: Viewpoint) {
        if !self.is_mounted() {
            return;
        }
        let camera = self.camera_mut();
        if let Some(fov) = viewpoint.fov_degrees {
            camera.set_fov_degrees(fov);
        }
        camera.set_view(Vec3::from(viewpoint.position), Vec3::from(viewpoint.target));
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.resize(width, height);
    }

    fn capture_image(&mut self) -> Result<String, ViewportError> {
        if !self.is_mounted() {
            return Err(ViewportError::NotMounted);
        }
        let image = self.capture()?;
        Ok(to_png_data_url(&image)?)
    }

    fn apply_modification(&mut self, modification: Modification) -> Modification {
        self.apply(modification).modification
    }

    fn export_stl(&self) -> Result<Vec<u8>, ViewportError> {
        Ok(export_stl(self.editor().store().objects())?)
    }

    fn export_selection_stl(&self) -> Result<Vec<u8>, ViewportError> {
        let store = self.editor().store();
        let selected = store
            .selected_objects()
            .iter()
            .filter_map(|id| store.get(id));
        Ok(export_stl(selected)?)
    }

    fn export_to_format(
        &self,
        id: &ObjectId,
        format: ExportFormat,
    ) -> Result<Vec<u8>, ViewportError> {
        let object = self
            .editor()
            .store()
            .get(id)
            .ok_or_else(|| ExportError::NotFound(id.to_string()))?;
        let bytes = match format {
            ExportFormat::Stl => export_stl([object])?,
            ExportFormat::Obj => export_obj(object)?,
        };
        Ok(bytes)
    }

    fn scene_state(&self) -> SceneSnapshot {
        self.editor().store().snapshot()
    }

    fn reset_model(&mut self) -> Modification {
        self.apply(Modification::new(ModificationKind::Reset))
            .modification
    }

    fn undo(&mut self) -> bool {
        Viewport::undo(self)
    }

    fn redo(&mut self) -> bool {
        Viewport::redo(self)
    }

    fn selected_object(&self) -> Option<ObjectId> {
        self.editor().store().selected_object().cloned()
    }

    fn selected_objects(&self) -> Vec<ObjectId> {
        self.editor().store().selected_objects().to_vec()
    }

    fn zoom_to_selection(&mut self) -> bool {
        Viewport::zoom_to_selection(self)
    }

    fn zoom_to_fit(&mut self) -> bool {
        Viewport::zoom_to_fit(self)
    }

    fn parse_command(&self, text: &str) -> Option<Modification> {
        self.parse(text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use studio_core::{ModificationSink, PrimitiveKind, PrimitiveSpec, ServiceError};

    use super::*;
    use crate::backend::RecordingBackend;
    use crate::capture::PNG_DATA_URL_PREFIX;
    use crate::config::RendererConfig;

    fn viewport() -> Viewport<RecordingBackend> {
        Viewport::mount(RecordingBackend::new(), RendererConfig::default(), 64, 48)
    }

    struct FailingSink(Mutex<usize>);

    impl ModificationSink for FailingSink {
        fn notify(&self, _modification: &Modification) -> Result<(), ServiceError> {
            if let Ok(mut calls) = self.0.lock() {
                *calls += 1;
            }
            Err(ServiceError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn test_sink_failure_does_not_roll_back() {
        let mut viewport = viewport();
        let sink = Arc::new(FailingSink(Mutex::new(0)));
        viewport.set_sink(sink.clone());
        let applied = viewport.apply_modification(Modification::new(
            ModificationKind::AddPrimitive(PrimitiveSpec::new(PrimitiveKind::Sphere)),
        ));
        assert!(applied.timestamp > 0);
        assert_eq!(viewport.scene_state().primitives.len(), 1);
        assert_eq!(*sink.0.lock().unwrap(), 1);
    }

    #[test]
    fn test_set_view_when_unmounted_is_noop() {
        let mut viewport = viewport();
        viewport.unmount();
        let before = viewport.camera().clone();
        viewport.set_view(Viewpoint {
            position: [1.0, 2.0, 3.0],
            target: [0.0; 3],
            fov_degrees: Some(60.0),
        });
        assert_eq!(viewport.camera(), &before);
        assert_eq!(viewport.capture_image(), Err(ViewportError::NotMounted));
    }

    #[test]
    fn test_capture_image_is_png_data_url() {
        let mut viewport = viewport();
        let url = viewport.capture_image().unwrap();
        assert!(url.starts_with(PNG_DATA_URL_PREFIX));
    }

    #[test]
    fn test_export_formats() {
        let mut viewport = viewport();
        assert!(matches!(
            viewport.export_stl(),
            Err(ViewportError::Export(ExportError::Empty))
        ));
        viewport.apply_modification(Modification::new(ModificationKind::AddPrimitive(
            PrimitiveSpec::new(PrimitiveKind::Cube),
        )));
        let id = viewport.selected_object().unwrap();
        let stl = viewport.export_to_format(&id, ExportFormat::Stl).unwrap();
        assert_eq!(stl.len(), 84 + 12 * 50);
        let obj = viewport.export_to_format(&id, ExportFormat::Obj).unwrap();
        assert!(String::from_utf8(obj).unwrap().contains("\nf "));
        assert!(matches!(
            viewport.export_to_format(&"ghost".into(), ExportFormat::Obj),
            Err(ViewportError::Export(ExportError::NotFound(_)))
        ));
        assert_eq!(viewport.export_selection_stl().unwrap(), stl);
    }

    #[test]
    fn test_reset_and_parse() {
        let mut viewport = viewport();
        let m = viewport.parse_command("add a torus").unwrap();
        viewport.apply_modification(m);
        let reset = viewport.reset_model();
        assert_eq!(reset.type_name(), "reset");
        assert!(viewport.scene_state().primitives.is_empty());
        assert!(viewport.undo());
        assert_eq!(viewport.scene_state().primitives.len(), 1);
    }
}
