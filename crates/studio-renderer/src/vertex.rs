//! Vertex formats shared by the wgpu pipelines

use bytemuck::{Pod, Zeroable};
use studio_core::Geometry;

/// Creates a vertex attribute with the offset calculated from the struct field.
macro_rules! vertex_attr {
    ($struct:ty, $field:ident, $location:expr, $format:ident) => {
        wgpu::VertexAttribute {
            offset: std::mem::offset_of!($struct, $field) as u64,
            shader_location: $location,
            format: wgpu::VertexFormat::$format,
        }
    };
}

/// Position + color vertex (grid lines).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PositionColorVertex {
    /// Vertex position in world space.
    pub position: [f32; 3],
    /// Vertex color (RGB).
    pub color: [f32; 3],
}

impl PositionColorVertex {
    /// Vertex attribute descriptors for the shader.
    pub const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &[
        vertex_attr!(PositionColorVertex, position, 0, Float32x3),
        vertex_attr!(PositionColorVertex, color, 1, Float32x3),
    ];

    /// Returns the vertex buffer layout for this vertex type.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: Self::ATTRIBUTES,
        }
    }
}

/// Vertex for mesh rendering with position, normal, and color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// Vertex position in local space.
    pub position: [f32; 3],
    /// Vertex normal vector.
    pub normal: [f32; 3],
    /// Vertex color (RGBA); only read when the instance uses vertex colors.
    pub color: [f32; 4],
}

impl MeshVertex {
    /// Vertex attribute descriptors for the shader.
    pub const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &[
        vertex_attr!(MeshVertex, position, 0, Float32x3),
        vertex_attr!(MeshVertex, normal, 1, Float32x3),
        vertex_attr!(MeshVertex, color, 2, Float32x4),
    ];

    /// Returns the vertex buffer layout for this vertex type.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: Self::ATTRIBUTES,
        }
    }
}

/// Interleave geometry with optional per-vertex colors
///
/// Colors are ignored unless there is exactly one per vertex.
pub fn mesh_vertices(geometry: &Geometry, colors: Option<&[[f32; 4]]>) -> Vec<MeshVertex> {
    let colors = colors.filter(|c| c.len() == geometry.positions.len());
    geometry
        .positions
        .iter()
        .enumerate()
        .map(|(i, &position)| MeshVertex {
            position,
            normal: geometry.normals.get(i).copied().unwrap_or([0.0, 0.0, 1.0]),
            color: colors.map_or([1.0; 4], |c| c[i]),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use studio_core::MeshSource;

    use super::*;

    #[test]
    fn test_attribute_offsets() {
        assert_eq!(MeshVertex::ATTRIBUTES[1].offset, 12);
        assert_eq!(MeshVertex::ATTRIBUTES[2].offset, 24);
        assert_eq!(std::mem::size_of::<MeshVertex>(), 40);
    }

    #[test]
    fn test_mismatched_colors_ignored() {
        let geometry = Geometry::from_source(&MeshSource::new(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0, 1, 2]],
        ))
        .unwrap();
        let red = [[1.0, 0.0, 0.0, 1.0]; 2];
        let vertices = mesh_vertices(&geometry, Some(&red));
        assert_eq!(vertices.len(), 3);
        assert!(vertices.iter().all(|v| v.color == [1.0; 4]));
    }
}
