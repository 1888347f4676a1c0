//! Viewport rendering state

use std::sync::Arc;

use parking_lot::Mutex;
use studio_renderer::{RendererConfig, Viewport, WgpuBackend};
use web_time::Instant;

/// egui registration of the backend's target texture
struct RegisteredTexture {
    egui_texture_id: egui::TextureId,
    generation: u64,
}

/// Viewport plus the egui texture that shows it
pub struct ViewportState {
    pub viewport: Viewport<WgpuBackend>,
    texture: Option<RegisteredTexture>,
}

/// Shared viewport state
pub type SharedViewportState = Arc<Mutex<ViewportState>>;

impl ViewportState {
    /// Mount a viewport on the eframe device
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        config: RendererConfig,
    ) -> Self {
        let backend = WgpuBackend::new(device, queue, format, &config, 800, 600);
        Self {
            viewport: Viewport::mount(backend, config, 800, 600),
            texture: None,
        }
    }

    /// Resize the target and return the egui texture showing it
    ///
    /// The texture is re-registered whenever the backend reallocates its
    /// target. Returns `None` once the viewport is unmounted.
    pub fn ensure_texture(
        &mut self,
        width: u32,
        height: u32,
        egui_renderer: &mut egui_wgpu::Renderer,
    ) -> Option<egui::TextureId> {
        let width = width.max(1);
        let height = height.max(1);
        if self.viewport.size() != (width, height) {
            self.viewport.resize(width, height);
        }

        let Some(backend) = self.viewport.backend() else {
            self.release_texture(egui_renderer);
            return None;
        };
        let generation = backend.target_generation();
        if let Some(texture) = &self.texture
            && texture.generation == generation
        {
            return Some(texture.egui_texture_id);
        }

        let egui_texture_id = egui_renderer.register_native_texture(
            backend.device(),
            backend.target_view(),
            wgpu::FilterMode::Linear,
        );
        if let Some(old) = self.texture.take() {
            egui_renderer.free_texture(&old.egui_texture_id);
        }
        self.texture = Some(RegisteredTexture {
            egui_texture_id,
            generation,
        });
        Some(egui_texture_id)
    }

    /// Run one frame of the viewport
    pub fn render(&mut self) {
        if let Err(e) = self.viewport.frame(Instant::now()) {
            tracing::error!("Viewport frame failed: {}", e);
        }
    }

    /// Free the egui texture and unmount the viewport
    pub fn shutdown(&mut self, egui_renderer: &mut egui_wgpu::Renderer) {
        self.release_texture(egui_renderer);
        self.viewport.unmount();
    }

    fn release_texture(&mut self, egui_renderer: &mut egui_wgpu::Renderer) {
        if let Some(old) = self.texture.take() {
            egui_renderer.free_texture(&old.egui_texture_id);
        }
    }
}
