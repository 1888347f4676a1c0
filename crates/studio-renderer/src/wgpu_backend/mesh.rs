//! Mesh and material GPU resources

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use studio_core::Material;
use wgpu::util::DeviceExt;

use crate::backend::{InstanceData, MeshUpload, RenderError};
use crate::pipeline::{PipelineConfig, uniform_bind_group, uniform_bind_group_layout};
use crate::vertex::{MeshVertex, mesh_vertices};

/// Per-mesh uniform (group 1)
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct InstanceUniform {
    /// Model matrix
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model matrix
    pub normal_matrix: [[f32; 4]; 4],
    /// x: selected, y: use vertex colors
    pub flags: [u32; 4],
}

impl InstanceUniform {
    /// Uniform for a transform and highlight state
    pub fn new(instance: &InstanceData, vertex_colors: bool) -> Self {
        let normal_matrix = if instance.model.determinant().abs() > f32::EPSILON {
            instance.model.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        Self {
            model: instance.model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            flags: [instance.selected as u32, vertex_colors as u32, 0, 0],
        }
    }
}

/// Per-material uniform (group 2)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    /// Base color and opacity
    pub color: [f32; 4],
    /// Emissive color premultiplied by intensity
    pub emissive: [f32; 4],
    /// x: metalness, y: roughness
    pub params: [f32; 4],
}

impl From<&Material> for MaterialUniform {
    fn from(material: &Material) -> Self {
        let e = material.emissive.to_array();
        let k = material.emissive_intensity.max(0.0);
        Self {
            color: material.color.to_rgba(material.effective_opacity().clamp(0.0, 1.0)),
            emissive: [e[0] * k, e[1] * k, e[2] * k, 0.0],
            params: [material.metalness, material.roughness, 0.0, 0.0],
        }
    }
}

/// Uploaded geometry with its instance uniform
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    edge_buffer: wgpu::Buffer,
    edge_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_bind_group: wgpu::BindGroup,
    vertex_colors: bool,
    instance: InstanceData,
}

impl GpuMesh {
    /// Last instance state written
    pub fn instance(&self) -> &InstanceData {
        &self.instance
    }
}

/// Uploaded material parameters
pub struct GpuMaterial {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    transparent: bool,
    wireframe: bool,
}

impl GpuMaterial {
    /// Drawn in the blended pass
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }
}

/// Mesh pipelines and bind group layouts
pub struct MeshRenderer {
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    wireframe_pipeline: wgpu::RenderPipeline,
    instance_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
}

impl MeshRenderer {
    /// Build the opaque, transparent and wireframe pipelines
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        sample_count: u32,
        scene_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let instance_layout = uniform_bind_group_layout(device, "Mesh Instance");
        let material_layout = uniform_bind_group_layout(device, "Mesh Material");
        let layouts = [scene_layout, &instance_layout, &material_layout];
        let shader = include_str!("../shaders/mesh.wgsl");
        let depth_format = crate::constants::DEPTH_FORMAT;

        let opaque_pipeline =
            PipelineConfig::new("Mesh Opaque", shader, format, depth_format, &layouts)
                .with_vertex_layouts(vec![MeshVertex::layout()])
                .with_blend(Some(wgpu::BlendState::REPLACE))
                .with_sample_count(sample_count)
                .build(device);

        let transparent_pipeline =
            PipelineConfig::new("Mesh Transparent", shader, format, depth_format, &layouts)
                .with_vertex_layouts(vec![MeshVertex::layout()])
                .with_depth(false, wgpu::CompareFunction::Less)
                .with_sample_count(sample_count)
                .build(device);

        let wireframe_pipeline =
            PipelineConfig::new("Mesh Wireframe", shader, format, depth_format, &layouts)
                .with_vertex_layouts(vec![MeshVertex::layout()])
                .with_topology(wgpu::PrimitiveTopology::LineList)
                .with_depth(true, wgpu::CompareFunction::LessEqual)
                .with_sample_count(sample_count)
                .build(device);

        Self {
            opaque_pipeline,
            transparent_pipeline,
            wireframe_pipeline,
            instance_layout,
            material_layout,
        }
    }

    /// Upload geometry, optional vertex colors and an identity instance
    pub fn create_mesh(
        &self,
        device: &wgpu::Device,
        upload: &MeshUpload<'_>,
    ) -> Result<GpuMesh, RenderError> {
        let geometry = upload.geometry;
        if geometry.triangle_count() == 0 || geometry.positions.is_empty() {
            return Err(RenderError::EmptyMesh(upload.label.to_string()));
        }
        let vertex_colors = upload
            .vertex_colors
            .is_some_and(|c| c.len() == geometry.positions.len());
        let vertices = mesh_vertices(geometry, upload.vertex_colors);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", upload.label)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", upload.label)),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let mut edges = geometry.edge_indices();
        let edge_count = edges.len() as u32;
        if edges.is_empty() {
            edges.extend([0, 0]);
        }
        let edge_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Edge Buffer", upload.label)),
            contents: bytemuck::cast_slice(&edges),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance = InstanceData {
            model: Mat4::IDENTITY,
            selected: false,
        };
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Instance Buffer", upload.label)),
            contents: bytemuck::cast_slice(&[InstanceUniform::new(&instance, vertex_colors)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let instance_bind_group =
            uniform_bind_group(device, &self.instance_layout, &instance_buffer, upload.label);

        Ok(GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
            edge_buffer,
            edge_count,
            instance_buffer,
            instance_bind_group,
            vertex_colors,
            instance,
        })
    }

    /// Write a new transform and highlight state
    pub fn update_instance(&self, queue: &wgpu::Queue, mesh: &mut GpuMesh, instance: &InstanceData) {
        mesh.instance = *instance;
        queue.write_buffer(
            &mesh.instance_buffer,
            0,
            bytemuck::cast_slice(&[InstanceUniform::new(instance, mesh.vertex_colors)]),
        );
    }

    /// Upload material parameters
    pub fn create_material(&self, device: &wgpu::Device, material: &Material) -> GpuMaterial {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Buffer"),
            contents: bytemuck::cast_slice(&[MaterialUniform::from(material)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = uniform_bind_group(device, &self.material_layout, &buffer, "Material");
        GpuMaterial {
            buffer,
            bind_group,
            transparent: material.effective_opacity() < 1.0,
            wireframe: material.wireframe,
        }
    }

    /// Overwrite material parameters in place
    pub fn update_material(&self, queue: &wgpu::Queue, gpu: &mut GpuMaterial, material: &Material) {
        gpu.transparent = material.effective_opacity() < 1.0;
        gpu.wireframe = material.wireframe;
        queue.write_buffer(
            &gpu.buffer,
            0,
            bytemuck::cast_slice(&[MaterialUniform::from(material)]),
        );
    }

    /// Draw one mesh; the scene bind group must already be set at group 0
    pub fn draw<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        mesh: &'a GpuMesh,
        material: &'a GpuMaterial,
    ) {
        render_pass.set_bind_group(1, &mesh.instance_bind_group, &[]);
        render_pass.set_bind_group(2, &material.bind_group, &[]);
        render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));

        if material.wireframe {
            if mesh.edge_count == 0 {
                return;
            }
            render_pass.set_pipeline(&self.wireframe_pipeline);
            render_pass.set_index_buffer(mesh.edge_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.edge_count, 0, 0..1);
            return;
        }

        let pipeline = if material.transparent {
            &self.transparent_pipeline
        } else {
            &self.opaque_pipeline
        };
        render_pass.set_pipeline(pipeline);
        render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use studio_core::Color;

    use super::*;

    #[test]
    fn test_material_uniform_opacity() {
        let mut material = Material::with_color(Color::rgb(1.0, 0.0, 0.0));
        material.opacity = 0.25;
        material.transparent = false;
        assert_eq!(MaterialUniform::from(&material).color[3], 1.0);
        material.transparent = true;
        assert_eq!(MaterialUniform::from(&material).color, [1.0, 0.0, 0.0, 0.25]);
    }

    #[test]
    fn test_emissive_premultiplied() {
        let material = Material {
            emissive: Color::rgb(0.5, 1.0, 0.0),
            emissive_intensity: 2.0,
            ..Default::default()
        };
        assert_eq!(MaterialUniform::from(&material).emissive, [1.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_instance_flags() {
        let instance = InstanceData {
            model: Mat4::from_scale(glam::Vec3::splat(2.0)),
            selected: true,
        };
        let uniform = InstanceUniform::new(&instance, true);
        assert_eq!(uniform.flags, [1, 1, 0, 0]);
        assert_eq!(uniform.normal_matrix[0][0], 0.5);
        assert_eq!(std::mem::size_of::<InstanceUniform>(), 144);
    }
}
