//! Contracts for remote collaborators
//!
//! Mesh generation and repair run on a backend; the viewport only sends
//! requests and installs the returned buffers.

use serde::{Deserialize, Serialize};

use crate::modification::Modification;
use crate::object::{MeshSource, MeshStats, ObjectId};

/// Remote service failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Service returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Mesh produced by the shape generation backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedShape {
    /// Shape kind without the `ai_` prefix, e.g. "chair"
    pub kind: String,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(flatten)]
    pub mesh: MeshSource,
}

/// Mesh repair operations offered by the remediation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationOp {
    Decimate,
    Smooth,
    Remesh,
    Repair,
}

impl RemediationOp {
    pub const ALL: [RemediationOp; 4] = [
        RemediationOp::Decimate,
        RemediationOp::Smooth,
        RemediationOp::Remesh,
        RemediationOp::Repair,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RemediationOp::Decimate => "Decimate",
            RemediationOp::Smooth => "Smooth",
            RemediationOp::Remesh => "Remesh",
            RemediationOp::Repair => "Repair",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationRequest {
    pub object_id: ObjectId,
    pub operation: RemediationOp,
    /// Operation strength in `[0, 1]`, e.g. the decimation ratio
    #[serde(default = "default_strength")]
    pub strength: f32,
    #[serde(flatten)]
    pub mesh: MeshSource,
}

fn default_strength() -> f32 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationResult {
    pub object_id: ObjectId,
    #[serde(flatten)]
    pub mesh: MeshSource,
    #[serde(default)]
    pub stats: Option<MeshStats>,
}

impl RemediationResult {
    pub fn stats(&self) -> MeshStats {
        self.stats.unwrap_or_else(|| self.mesh.stats())
    }
}

/// Generates meshes from text prompts
pub trait ShapeService: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<GeneratedShape, ServiceError>;
}

/// Runs mesh repair operations
pub trait RemediationService: Send + Sync {
    fn remediate(&self, request: &RemediationRequest) -> Result<RemediationResult, ServiceError>;
}

/// Receives applied modifications (best effort, never rolls back the scene)
pub trait ModificationSink: Send + Sync {
    fn notify(&self, modification: &Modification) -> Result<(), ServiceError>;
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ModificationSink for NullSink {
    fn notify(&self, _modification: &Modification) -> Result<(), ServiceError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remediation_request_json() {
        let request = RemediationRequest {
            object_id: "abc".into(),
            operation: RemediationOp::Decimate,
            strength: 0.25,
            mesh: MeshSource::new(vec![[0.0; 3]; 3], vec![[0, 1, 2]]),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["operation"], "decimate");
        assert_eq!(json["faces"][0][2], 2);
        assert_eq!(json["object_id"], "abc");
    }

    #[test]
    fn test_result_stats_fall_back_to_mesh() {
        let result: RemediationResult = serde_json::from_str(
            r#"{"object_id":"a","vertices":[[0,0,0],[1,0,0],[0,1,0]],"faces":[[0,1,2]]}"#,
        )
        .unwrap();
        assert_eq!(result.stats().vertex_count, 3);
        assert_eq!(result.stats().face_count, 1);
    }
}
