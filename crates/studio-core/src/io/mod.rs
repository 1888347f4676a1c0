//! Mesh import and export
//!
//! Loaders return a [`MeshSource`] that becomes the payload of a `Mesh`
//! shape; exporters write world-space triangles.

mod export;
mod gltf_mesh;
mod obj;
mod stl;

use std::path::Path;

pub use export::{export_obj, export_stl};

use crate::object::MeshSource;

/// Mesh file format, detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
    Obj,
    Gltf,
    Glb,
}

impl MeshFormat {
    pub const ALL: [MeshFormat; 4] = [
        MeshFormat::Stl,
        MeshFormat::Obj,
        MeshFormat::Gltf,
        MeshFormat::Glb,
    ];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "stl" => Some(MeshFormat::Stl),
            "obj" => Some(MeshFormat::Obj),
            "gltf" => Some(MeshFormat::Gltf),
            "glb" => Some(MeshFormat::Glb),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MeshFormat::Stl => "stl",
            MeshFormat::Obj => "obj",
            MeshFormat::Gltf => "gltf",
            MeshFormat::Glb => "glb",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MeshFormat::Stl => "STL",
            MeshFormat::Obj => "OBJ",
            MeshFormat::Gltf | MeshFormat::Glb => "glTF",
        }
    }
}

/// Mesh loading errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Empty mesh: no geometry found")]
    EmptyMesh,
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Mesh writing errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("Nothing to export")]
    Empty,
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Write error: {0}")]
    Write(String),
}

/// Decode a mesh from an in-memory file
pub fn import_bytes(bytes: &[u8], format: MeshFormat) -> Result<MeshSource, ImportError> {
    let mesh = match format {
        MeshFormat::Stl => stl::read(bytes)?,
        MeshFormat::Obj => obj::read(bytes)?,
        MeshFormat::Gltf | MeshFormat::Glb => gltf_mesh::read(bytes)?,
    };
    if mesh.is_empty() {
        return Err(ImportError::EmptyMesh);
    }
    tracing::debug!(
        "Imported {} mesh: {} vertices, {} faces",
        format.name(),
        mesh.vertices.len(),
        mesh.faces.len()
    );
    Ok(mesh)
}

/// Load a mesh file, picking the decoder from its extension
pub fn import_path(path: impl AsRef<Path>) -> Result<MeshSource, ImportError> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path).ok_or_else(|| {
        ImportError::UnsupportedFormat(
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
        )
    })?;
    let bytes = std::fs::read(path).map_err(|e| ImportError::Io(e.to_string()))?;
    import_bytes(&bytes, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            MeshFormat::from_path(Path::new("a/b/Part.STL")),
            Some(MeshFormat::Stl)
        );
        assert_eq!(MeshFormat::from_path(Path::new("scene.glb")), Some(MeshFormat::Glb));
        assert_eq!(MeshFormat::from_path(Path::new("robot.dae")), None);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = import_path("model.step").unwrap_err();
        assert_eq!(err, ImportError::UnsupportedFormat("step".into()));
    }
}
