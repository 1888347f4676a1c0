//! Ground grid renderer

use wgpu::util::DeviceExt;

use crate::config::GridConfig;
use crate::pipeline::PipelineConfig;
use crate::vertex::PositionColorVertex;

/// Grid renderer
pub struct GridRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    config: GridConfig,
}

impl GridRenderer {
    /// Build the pipeline and the initial line buffer
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        sample_count: u32,
        scene_layout: &wgpu::BindGroupLayout,
        config: &GridConfig,
    ) -> Self {
        let pipeline = PipelineConfig::new(
            "Grid",
            include_str!("../shaders/grid.wgsl"),
            format,
            crate::constants::DEPTH_FORMAT,
            &[scene_layout],
        )
        .with_vertex_layouts(vec![PositionColorVertex::layout()])
        .with_topology(wgpu::PrimitiveTopology::LineList)
        .with_sample_count(sample_count)
        .build(device);

        let (vertex_buffer, vertex_count) = create_vertex_buffer(device, config);

        Self {
            pipeline,
            vertex_buffer,
            vertex_count,
            config: config.clone(),
        }
    }

    /// Rebuild the line buffer if the grid settings changed
    pub fn sync(&mut self, device: &wgpu::Device, config: &GridConfig) {
        if &self.config == config {
            return;
        }
        let (vertex_buffer, vertex_count) = create_vertex_buffer(device, config);
        self.vertex_buffer = vertex_buffer;
        self.vertex_count = vertex_count;
        self.config = config.clone();
    }

    /// Draw the grid; the scene bind group must already be set at group 0
    pub fn render<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        if !self.config.enabled || self.vertex_count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..self.vertex_count, 0..1);
    }
}

fn create_vertex_buffer(device: &wgpu::Device, config: &GridConfig) -> (wgpu::Buffer, u32) {
    let mut vertices = generate_grid_vertices(config);
    // Zero-sized buffers are not allowed
    if vertices.is_empty() {
        vertices.push(PositionColorVertex {
            position: [0.0; 3],
            color: [0.0; 3],
        });
    }
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Grid Vertex Buffer"),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let count = if config.enabled {
        generate_line_count(config) * 2
    } else {
        0
    };
    (buffer, count)
}

fn generate_line_count(config: &GridConfig) -> u32 {
    if config.spacing <= 0.0 || config.size <= 0.0 {
        return 0;
    }
    let num_lines = (config.size / config.spacing) as u32;
    2 * (2 * num_lines + 1)
}

/// Grid line vertices on the z = 0 plane
///
/// Lines through the origin use the axis colors. Returns nothing for a
/// non-positive size or spacing.
pub fn generate_grid_vertices(config: &GridConfig) -> Vec<PositionColorVertex> {
    if config.spacing <= 0.0 || config.size <= 0.0 {
        return Vec::new();
    }
    let half_size = config.size;
    let num_lines = (config.size / config.spacing) as i32;
    let mut vertices = Vec::with_capacity(generate_line_count(config) as usize * 2);

    // Lines parallel to X axis
    for i in -num_lines..=num_lines {
        let y = i as f32 * config.spacing;
        let color = if i == 0 {
            config.x_axis_color
        } else {
            config.line_color
        };
        vertices.push(PositionColorVertex {
            position: [-half_size, y, 0.0],
            color,
        });
        vertices.push(PositionColorVertex {
            position: [half_size, y, 0.0],
            color,
        });
    }

    // Lines parallel to Y axis
    for i in -num_lines..=num_lines {
        let x = i as f32 * config.spacing;
        let color = if i == 0 {
            config.y_axis_color
        } else {
            config.line_color
        };
        vertices.push(PositionColorVertex {
            position: [x, -half_size, 0.0],
            color,
        });
        vertices.push(PositionColorVertex {
            position: [x, half_size, 0.0],
            color,
        });
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_vertex_count() {
        let config = GridConfig {
            size: 2.0,
            spacing: 1.0,
            ..Default::default()
        };
        let vertices = generate_grid_vertices(&config);
        // 5 lines per direction, 2 vertices each
        assert_eq!(vertices.len(), 20);
        assert_eq!(vertices.len() as u32, generate_line_count(&config) * 2);
    }

    #[test]
    fn test_axis_lines_colored() {
        let config = GridConfig::default();
        let vertices = generate_grid_vertices(&config);
        let x_axis = vertices
            .iter()
            .filter(|v| v.color == config.x_axis_color)
            .count();
        assert_eq!(x_axis, 2);
        assert!(vertices.iter().all(|v| v.position[2] == 0.0));
    }

    #[test]
    fn test_degenerate_spacing() {
        let config = GridConfig {
            spacing: 0.0,
            ..Default::default()
        };
        assert!(generate_grid_vertices(&config).is_empty());
    }
}
