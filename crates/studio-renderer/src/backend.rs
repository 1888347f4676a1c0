//! Render backend seam
//!
//! The viewport talks to the GPU only through [`RenderBackend`]. Handles are
//! plain ids; the backend owns every buffer, texture and pipeline behind them.

use std::collections::{HashMap, HashSet};

use glam::Mat4;
use studio_core::{Geometry, Material};

use crate::camera::Camera;
use crate::config::RendererConfig;

/// Backend-side mesh resource id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u64);

/// Backend-side material resource id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle(pub u64);

/// Geometry to upload for one object
#[derive(Debug, Clone, Copy)]
pub struct MeshUpload<'a> {
    /// Debug label (object id)
    pub label: &'a str,
    /// Object-space triangles
    pub geometry: &'a Geometry,
    /// Per-vertex colors replacing the material color (scalar overlays)
    pub vertex_colors: Option<&'a [[f32; 4]]>,
}

/// Per-object transform and highlight state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceData {
    /// World transform
    pub model: Mat4,
    /// Draw with the selection tint
    pub selected: bool,
}

/// One draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawItem {
    /// Geometry to draw
    pub mesh: MeshHandle,
    /// Surface to shade it with
    pub material: MaterialHandle,
}

/// Everything a backend needs to draw one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameData<'a> {
    /// View and projection
    pub camera: &'a Camera,
    /// Draw list in scene order
    pub items: &'a [DrawItem],
    /// Grid, lighting and clear color
    pub config: &'a RendererConfig,
}

/// Pixels read back from the render target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Tightly packed RGBA8 rows, top row first
    pub rgba: Vec<u8>,
}

/// Backend errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// Geometry had no triangles
    #[error("Mesh '{0}' has no triangles")]
    EmptyMesh(String),
    /// Handle not known to the backend
    #[error("Unknown mesh handle {0:?}")]
    UnknownMesh(MeshHandle),
    /// Render target of zero size
    #[error("Render target has zero size")]
    ZeroSize,
    /// Read-back failed
    #[error("Capture failed: {0}")]
    Capture(String),
    /// Backend already shut down
    #[error("Render backend has been shut down")]
    ShutDown,
}

/// GPU resource and drawing interface used by the viewport
pub trait RenderBackend {
    /// Resize the render target (pixels)
    fn resize(&mut self, width: u32, height: u32);

    /// Upload geometry
    fn create_mesh(&mut self, upload: &MeshUpload<'_>) -> Result<MeshHandle, RenderError>;

    /// Create a material resource
    fn create_material(&mut self, material: &Material) -> MaterialHandle;

    /// Update material parameters in place
    fn update_material(&mut self, handle: MaterialHandle, material: &Material);

    /// Update the transform and highlight of a mesh
    fn update_instance(&mut self, mesh: MeshHandle, instance: &InstanceData);

    /// Release geometry
    fn dispose_mesh(&mut self, handle: MeshHandle);

    /// Release a material
    fn dispose_material(&mut self, handle: MaterialHandle);

    /// Draw one frame into the render target
    fn render(&mut self, frame: &FrameData<'_>) -> Result<(), RenderError>;

    /// Draw one frame and read it back
    fn capture(&mut self, frame: &FrameData<'_>) -> Result<CapturedImage, RenderError>;

    /// Release every remaining resource; the backend is unusable afterwards
    fn shutdown(&mut self);
}

/// Headless backend that records resource traffic
///
/// Runs the viewport without a GPU. Tests use the recorded disposal lists
/// to check that every resource is released exactly once.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_id: u64,
    size: (u32, u32),
    live_meshes: HashSet<MeshHandle>,
    live_materials: HashMap<MaterialHandle, Material>,
    instances: HashMap<MeshHandle, InstanceData>,
    /// Every mesh ever created, in order
    pub created_meshes: Vec<MeshHandle>,
    /// Every material ever created, in order
    pub created_materials: Vec<MaterialHandle>,
    /// Every mesh disposal call, in order (duplicates included)
    pub disposed_meshes: Vec<MeshHandle>,
    /// Every material disposal call, in order (duplicates included)
    pub disposed_materials: Vec<MaterialHandle>,
    /// Number of frames drawn
    pub frames_rendered: usize,
    /// Draw list of the most recent frame
    pub last_items: Vec<DrawItem>,
    /// Whether `shutdown` ran
    pub shut_down: bool,
}

impl RecordingBackend {
    /// Empty backend
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Meshes created and not yet disposed
    pub fn live_mesh_count(&self) -> usize {
        self.live_meshes.len()
    }

    /// Materials created and not yet disposed
    pub fn live_material_count(&self) -> usize {
        self.live_materials.len()
    }

    /// Last instance data sent for a mesh
    pub fn instance(&self, mesh: MeshHandle) -> Option<&InstanceData> {
        self.instances.get(&mesh)
    }

    /// Current parameters of a material
    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.live_materials.get(&handle)
    }

    /// Current render target size
    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

impl RenderBackend for RecordingBackend {
    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn create_mesh(&mut self, upload: &MeshUpload<'_>) -> Result<MeshHandle, RenderError> {
        if self.shut_down {
            return Err(RenderError::ShutDown);
        }
        if upload.geometry.triangle_count() == 0 {
            return Err(RenderError::EmptyMesh(upload.label.to_string()));
        }
        let handle = MeshHandle(self.next());
        self.live_meshes.insert(handle);
        self.created_meshes.push(handle);
        Ok(handle)
    }

    fn create_material(&mut self, material: &Material) -> MaterialHandle {
        let handle = MaterialHandle(self.next());
        self.live_materials.insert(handle, material.clone());
        self.created_materials.push(handle);
        handle
    }

    fn update_material(&mut self, handle: MaterialHandle, material: &Material) {
        if let Some(slot) = self.live_materials.get_mut(&handle) {
            *slot = material.clone();
        }
    }

    fn update_instance(&mut self, mesh: MeshHandle, instance: &InstanceData) {
        if self.live_meshes.contains(&mesh) {
            self.instances.insert(mesh, *instance);
        }
    }

    fn dispose_mesh(&mut self, handle: MeshHandle) {
        self.live_meshes.remove(&handle);
        self.instances.remove(&handle);
        self.disposed_meshes.push(handle);
    }

    fn dispose_material(&mut self, handle: MaterialHandle) {
        self.live_materials.remove(&handle);
        self.disposed_materials.push(handle);
    }

    fn render(&mut self, frame: &FrameData<'_>) -> Result<(), RenderError> {
        if self.shut_down {
            return Err(RenderError::ShutDown);
        }
        if let Some(item) = frame
            .items
            .iter()
            .find(|item| !self.live_meshes.contains(&item.mesh))
        {
            return Err(RenderError::UnknownMesh(item.mesh));
        }
        self.frames_rendered += 1;
        self.last_items = frame.items.to_vec();
        Ok(())
    }

    fn capture(&mut self, frame: &FrameData<'_>) -> Result<CapturedImage, RenderError> {
        self.render(frame)?;
        let (width, height) = self.size;
        if width == 0 || height == 0 {
            return Err(RenderError::ZeroSize);
        }
        let pixel = frame
            .config
            .viewport
            .background_color
            .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        Ok(CapturedImage {
            width,
            height,
            rgba: pixel.repeat((width * height) as usize),
        })
    }

    fn shutdown(&mut self) {
        self.live_meshes.clear();
        self.live_materials.clear();
        self.instances.clear();
        self.shut_down = true;
    }
}
