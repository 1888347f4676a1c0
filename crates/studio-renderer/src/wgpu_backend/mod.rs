//! wgpu implementation of [`RenderBackend`]
//!
//! Renders into an offscreen texture owned by the backend. The frontend shows
//! that texture through egui and re-registers it whenever
//! [`WgpuBackend::target_generation`] changes.

mod grid;
mod mesh;
mod target;

use std::collections::HashMap;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use studio_core::Material;
use wgpu::util::DeviceExt;

pub use grid::{GridRenderer, generate_grid_vertices};
pub use mesh::{GpuMaterial, GpuMesh, InstanceUniform, MaterialUniform, MeshRenderer};
pub use target::RenderTarget;

use crate::backend::{
    CapturedImage, FrameData, InstanceData, MaterialHandle, MeshHandle, MeshUpload,
    RenderBackend, RenderError,
};
use crate::config::RendererConfig;
use crate::constants::SELECTION_TINT;
use crate::pipeline::{uniform_bind_group, uniform_bind_group_layout};

/// Scene-wide uniform (group 0)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneUniform {
    /// View-projection matrix
    pub view_proj: [[f32; 4]; 4],
    /// Camera position
    pub eye: [f32; 4],
    /// Direction towards the light
    pub light_dir: [f32; 4],
    /// Light color premultiplied by intensity
    pub light_color: [f32; 4],
    /// Ambient color premultiplied by strength
    pub ambient: [f32; 4],
    /// Selection highlight color
    pub selection_tint: [f32; 4],
}

impl SceneUniform {
    /// Uniform for one frame
    pub fn new(frame: &FrameData<'_>) -> Self {
        let lighting = &frame.config.lighting;
        let dir = Vec3::from(lighting.direction)
            .try_normalize()
            .unwrap_or(Vec3::Z);
        let eye = frame.camera.position;
        let scale = |c: [f32; 3], k: f32| [c[0] * k, c[1] * k, c[2] * k, 1.0];
        Self {
            view_proj: frame.camera.view_projection().to_cols_array_2d(),
            eye: [eye.x, eye.y, eye.z, 1.0],
            light_dir: [dir.x, dir.y, dir.z, 0.0],
            light_color: scale(lighting.color, lighting.intensity),
            ambient: scale(lighting.ambient_color, lighting.ambient_strength),
            selection_tint: [SELECTION_TINT[0], SELECTION_TINT[1], SELECTION_TINT[2], 1.0],
        }
    }
}

/// GPU backend drawing into an offscreen texture
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    target: RenderTarget,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    grid: GridRenderer,
    mesh_renderer: MeshRenderer,
    meshes: HashMap<MeshHandle, GpuMesh>,
    materials: HashMap<MaterialHandle, GpuMaterial>,
    next_id: u64,
    shut_down: bool,
}

impl WgpuBackend {
    /// Create pipelines and an offscreen target of the given size
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        config: &RendererConfig,
        width: u32,
        height: u32,
    ) -> Self {
        let sample_count = config.viewport.sample_count();
        let target = RenderTarget::new(&device, format, sample_count, width, height);

        let scene_layout = uniform_bind_group_layout(&device, "Scene");
        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniform Buffer"),
            contents: bytemuck::cast_slice(&[SceneUniform::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let scene_bind_group = uniform_bind_group(&device, &scene_layout, &scene_buffer, "Scene");

        let grid = GridRenderer::new(&device, format, sample_count, &scene_layout, &config.grid);
        let mesh_renderer = MeshRenderer::new(&device, format, sample_count, &scene_layout);

        tracing::info!(
            "wgpu backend created: {}x{}, {:?}, {}x MSAA",
            target.size().0,
            target.size().1,
            format,
            sample_count
        );

        Self {
            device,
            queue,
            target,
            scene_buffer,
            scene_bind_group,
            grid,
            mesh_renderer,
            meshes: HashMap::new(),
            materials: HashMap::new(),
            next_id: 0,
            shut_down: false,
        }
    }

    /// Device the backend renders with
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// View of the resolved color texture
    pub fn target_view(&self) -> &wgpu::TextureView {
        self.target.color_view()
    }

    /// Changes whenever the target texture is reallocated
    pub fn target_generation(&self) -> u64 {
        self.target.generation()
    }

    /// Render target size in pixels
    pub fn target_size(&self) -> (u32, u32) {
        self.target.size()
    }

    /// Number of live meshes
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn encode_frame(&mut self, frame: &FrameData<'_>) -> Result<wgpu::CommandEncoder, RenderError> {
        if self.shut_down {
            return Err(RenderError::ShutDown);
        }
        if let Some(item) = frame
            .items
            .iter()
            .find(|item| !self.meshes.contains_key(&item.mesh))
        {
            return Err(RenderError::UnknownMesh(item.mesh));
        }

        self.grid.sync(&self.device, &frame.config.grid);
        self.queue.write_buffer(
            &self.scene_buffer,
            0,
            bytemuck::cast_slice(&[SceneUniform::new(frame)]),
        );

        let [r, g, b, a] = frame.config.viewport.background_color;
        let clear = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        };

        // Opaque first, then blended surfaces without depth writes
        let mut opaque = Vec::with_capacity(frame.items.len());
        let mut transparent = Vec::new();
        for item in frame.items {
            let (Some(mesh), Some(material)) =
                (self.meshes.get(&item.mesh), self.materials.get(&item.material))
            else {
                continue;
            };
            if material.is_transparent() {
                transparent.push((mesh, material));
            } else {
                opaque.push((mesh, material));
            }
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Viewport Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Viewport Pass"),
                color_attachments: &[Some(self.target.color_attachment(clear))],
                depth_stencil_attachment: Some(self.target.depth_attachment()),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
            self.grid.render(&mut render_pass);
            for (mesh, material) in opaque.into_iter().chain(transparent) {
                self.mesh_renderer.draw(&mut render_pass, mesh, material);
            }
        }
        Ok(encoder)
    }
}

impl RenderBackend for WgpuBackend {
    fn resize(&mut self, width: u32, height: u32) {
        if self.target.resize(&self.device, width, height) {
            tracing::debug!("Render target resized to {}x{}", width, height);
        }
    }

    fn create_mesh(&mut self, upload: &MeshUpload<'_>) -> Result<MeshHandle, RenderError> {
        if self.shut_down {
            return Err(RenderError::ShutDown);
        }
        let mesh = self.mesh_renderer.create_mesh(&self.device, upload)?;
        let handle = MeshHandle(self.next());
        tracing::debug!(
            "Uploaded mesh '{}' as {:?}: {} vertices, {} triangles",
            upload.label,
            handle,
            upload.geometry.vertex_count(),
            upload.geometry.triangle_count()
        );
        self.meshes.insert(handle, mesh);
        Ok(handle)
    }

    fn create_material(&mut self, material: &Material) -> MaterialHandle {
        let gpu = self.mesh_renderer.create_material(&self.device, material);
        let handle = MaterialHandle(self.next());
        self.materials.insert(handle, gpu);
        handle
    }

    fn update_material(&mut self, handle: MaterialHandle, material: &Material) {
        if let Some(gpu) = self.materials.get_mut(&handle) {
            self.mesh_renderer.update_material(&self.queue, gpu, material);
        }
    }

    fn update_instance(&mut self, mesh: MeshHandle, instance: &InstanceData) {
        if let Some(gpu) = self.meshes.get_mut(&mesh) {
            if gpu.instance() != instance {
                self.mesh_renderer.update_instance(&self.queue, gpu, instance);
            }
        }
    }

    fn dispose_mesh(&mut self, handle: MeshHandle) {
        if self.meshes.remove(&handle).is_none() {
            tracing::warn!("Dispose of unknown mesh {:?}", handle);
        }
    }

    fn dispose_material(&mut self, handle: MaterialHandle) {
        if self.materials.remove(&handle).is_none() {
            tracing::warn!("Dispose of unknown material {:?}", handle);
        }
    }

    fn render(&mut self, frame: &FrameData<'_>) -> Result<(), RenderError> {
        let encoder = self.encode_frame(frame)?;
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn capture(&mut self, frame: &FrameData<'_>) -> Result<CapturedImage, RenderError> {
        let mut encoder = self.encode_frame(frame)?;
        let (width, height) = self.target.size();
        let padded_row = padded_bytes_per_row(width);

        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Readback Buffer"),
            size: padded_row as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: self.target.color_texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = readback.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);
        // The web backend cannot block on the map callback
        let mapped = if cfg!(target_arch = "wasm32") {
            receiver
                .try_recv()
                .map_err(|e| RenderError::Capture(e.to_string()))?
        } else {
            receiver
                .recv()
                .map_err(|e| RenderError::Capture(e.to_string()))?
        };
        mapped.map_err(|e| RenderError::Capture(e.to_string()))?;

        let rgba = {
            let data = slice.get_mapped_range();
            unpad_rows(&data, width, height, padded_row, is_bgra(self.target.format()))
        };
        readback.unmap();

        Ok(CapturedImage {
            width,
            height,
            rgba,
        })
    }

    fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        tracing::info!(
            "wgpu backend shut down ({} meshes, {} materials released)",
            self.meshes.len(),
            self.materials.len()
        );
        self.meshes.clear();
        self.materials.clear();
        self.shut_down = true;
    }
}

fn is_bgra(format: wgpu::TextureFormat) -> bool {
    matches!(
        format,
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
    )
}

/// Row pitch for texture-to-buffer copies
fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Strip row padding and convert to RGBA
fn unpad_rows(data: &[u8], width: u32, height: u32, padded_row: u32, bgra: bool) -> Vec<u8> {
    let row_len = width as usize * 4;
    let mut rgba = Vec::with_capacity(row_len * height as usize);
    for row in data.chunks(padded_row as usize).take(height as usize) {
        rgba.extend_from_slice(&row[..row_len]);
    }
    if bgra {
        for pixel in rgba.chunks_exact_mut(4) {
            pixel.swap(0, 2);
        }
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;

    #[test]
    fn test_padded_row() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(1), 256);
    }

    #[test]
    fn test_unpad_rows_swaps_bgra() {
        let mut data = vec![0u8; 512];
        data[..4].copy_from_slice(&[1, 2, 3, 4]);
        data[256..260].copy_from_slice(&[5, 6, 7, 8]);
        let rgba = unpad_rows(&data, 1, 2, 256, true);
        assert_eq!(rgba, vec![3, 2, 1, 4, 7, 6, 5, 8]);
        let raw = unpad_rows(&data, 1, 2, 256, false);
        assert_eq!(raw, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_scene_uniform_lighting() {
        let camera = Camera::new(1.0);
        let config = RendererConfig::default();
        let frame = FrameData {
            camera: &camera,
            items: &[],
            config: &config,
        };
        let uniform = SceneUniform::new(&frame);
        let dir = Vec3::new(uniform.light_dir[0], uniform.light_dir[1], uniform.light_dir[2]);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert_eq!(uniform.ambient, [0.3, 0.3, 0.3, 1.0]);
        assert_eq!(std::mem::size_of::<SceneUniform>(), 144);
    }
}
