//! Design Studio Renderer
//!
//! Interactive 3D viewport for the design studio.
//!
//! # Architecture
//!
//! - [`viewport::Viewport`] - Mount/unmount lifecycle, input, frame loop
//! - [`handle::ViewportHandle`] - Imperative API for embedding collaborators
//! - [`backend::RenderBackend`] - GPU seam; [`wgpu_backend::WgpuBackend`] draws,
//!   [`backend::RecordingBackend`] runs headless
//! - [`registry::ResourceRegistry`] - Scene objects to backend resources
//! - [`selection::SelectionEngine`] - Point picking and box selection
//! - [`autofit::AutoFit`] - Debounced camera framing
//!
//! # Module Structure
//!
//! ```text
//! studio-renderer/
//! ├── backend.rs       # RenderBackend trait, headless backend
//! ├── wgpu_backend/    # Offscreen target, grid and mesh pipelines
//! ├── scene/           # BoundingBox, Ray, intersection tests
//! ├── camera.rs        # Orbit camera
//! ├── selection.rs     # Picking and marquee selection
//! ├── autofit.rs       # Camera framing
//! ├── registry.rs      # GPU resource bookkeeping
//! ├── capture.rs       # PNG data URLs
//! ├── handle.rs        # ViewportHandle
//! └── viewport.rs      # Viewport
//! ```

pub mod autofit;
pub mod backend;
pub mod camera;
pub mod capture;
pub mod config;
pub mod constants;
pub mod handle;
pub mod pipeline;
pub mod registry;
pub mod scene;
pub mod selection;
pub mod vertex;
pub mod viewport;
pub mod wgpu_backend;

pub use autofit::{AutoFit, FrameTarget, compute_frame, zoom_to_bounds};
pub use backend::{
    CapturedImage, DrawItem, FrameData, InstanceData, MaterialHandle, MeshHandle, MeshUpload,
    RecordingBackend, RenderBackend, RenderError,
};
pub use camera::Camera;
pub use capture::{CaptureError, PNG_DATA_URL_PREFIX, to_png_data_url};
pub use config::{
    AutoFitConfig, CameraConfig, GridConfig, LightingConfig, RendererConfig, ViewportConfig,
};
pub use handle::{ExportFormat, Viewpoint, ViewportError, ViewportHandle};
pub use registry::ResourceRegistry;
pub use scene::{BoundingBox, Ray};
pub use selection::{Marquee, NdcRect, SelectionEngine, SelectionMode};
pub use viewport::Viewport;
pub use wgpu_backend::WgpuBackend;
