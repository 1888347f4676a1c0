//! Modifications: typed history entries describing scene mutations
//!
//! On the wire a modification looks like
//! `{"type": "rotate", "parameters": {"axis": "z", "angle": 0.5}, "description": "...", "timestamp": 0}`.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::PrimitiveSpec;
use crate::object::BooleanOp;

/// World axis; anything unrecognized reads as Y
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Axis {
    X,
    #[default]
    Y,
    Z,
}

impl Axis {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "x" => Axis::X,
            "z" => Axis::Z,
            _ => Axis::Y,
        }
    }

    pub fn unit(&self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

impl From<String> for Axis {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

/// Zoom request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomDirection {
    In,
    Out,
    Fit,
}

/// Operation plus its typed parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "parameters", rename_all = "snake_case")]
pub enum ModificationKind {
    Translate {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        #[serde(default)]
        z: f32,
    },
    Rotate {
        #[serde(default)]
        axis: Axis,
        /// Radians
        angle: f32,
    },
    Scale {
        factor: f32,
    },
    Boolean {
        operation: BooleanOp,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    Extrude {
        distance: f32,
    },
    Chamfer {
        size: f32,
    },
    Reset,
    AddPrimitive(PrimitiveSpec),
    Delete,
    Select {
        target: String,
    },
    Zoom {
        direction: ZoomDirection,
    },
    /// `None` toggles, `Some` sets the mode explicitly
    BoundingBoxSelect {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        enabled: Option<bool>,
    },
}

impl ModificationKind {
    /// Snake-case type tag
    pub fn type_name(&self) -> &'static str {
        match self {
            ModificationKind::Translate { .. } => "translate",
            ModificationKind::Rotate { .. } => "rotate",
            ModificationKind::Scale { .. } => "scale",
            ModificationKind::Boolean { .. } => "boolean",
            ModificationKind::Extrude { .. } => "extrude",
            ModificationKind::Chamfer { .. } => "chamfer",
            ModificationKind::Reset => "reset",
            ModificationKind::AddPrimitive(_) => "add_primitive",
            ModificationKind::Delete => "delete",
            ModificationKind::Select { .. } => "select",
            ModificationKind::Zoom { .. } => "zoom",
            ModificationKind::BoundingBoxSelect { .. } => "bounding_box_select",
        }
    }

    /// Human readable summary for chat and undo lists
    pub fn describe(&self) -> String {
        match self {
            ModificationKind::Translate { x, y, z } => {
                format!("Move by ({:.2}, {:.2}, {:.2})", x, y, z)
            }
            ModificationKind::Rotate { axis, angle } => {
                format!("Rotate {:.1}° around {}", angle.to_degrees(), axis)
            }
            ModificationKind::Scale { factor } => format!("Scale by {:.2}x", factor),
            ModificationKind::Boolean { operation, .. } => {
                format!("Boolean {}", operation.name())
            }
            ModificationKind::Extrude { distance } => format!("Extrude {:.2}", distance),
            ModificationKind::Chamfer { size } => format!("Chamfer {:.2}", size),
            ModificationKind::Reset => "Reset model".into(),
            ModificationKind::AddPrimitive(spec) => format!("Add {}", spec.kind),
            ModificationKind::Delete => "Delete selection".into(),
            ModificationKind::Select { target } => format!("Select {}", target),
            ModificationKind::Zoom { direction } => match direction {
                ZoomDirection::In => "Zoom in".into(),
                ZoomDirection::Out => "Zoom out".into(),
                ZoomDirection::Fit => "Zoom to fit".into(),
            },
            ModificationKind::BoundingBoxSelect { enabled } => match enabled {
                Some(true) => "Enable box selection".into(),
                Some(false) => "Disable box selection".into(),
                None => "Toggle box selection".into(),
            },
        }
    }
}

/// One history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    #[serde(flatten)]
    pub kind: ModificationKind,
    #[serde(default)]
    pub description: String,
    /// Milliseconds since the UNIX epoch, stamped on apply
    #[serde(default)]
    pub timestamp: u64,
}

impl Modification {
    /// New unstamped modification with a generated description
    pub fn new(kind: ModificationKind) -> Self {
        let description = kind.describe();
        Self {
            kind,
            description,
            timestamp: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Parse from JSON; unknown types and malformed payloads yield `None`
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<Self>(json) {
            Ok(modification) => Some(modification),
            Err(e) => {
                tracing::warn!("Ignoring unrecognized modification: {}", e);
                None
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<ModificationKind> for Modification {
    fn from(kind: ModificationKind) -> Self {
        Self::new(kind)
    }
}

/// Current wall-clock time in milliseconds since the UNIX epoch
pub fn now_millis() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PrimitiveKind;

    #[test]
    fn test_wire_format() {
        let m = Modification::new(ModificationKind::Rotate {
            axis: Axis::Z,
            angle: 1.0,
        });
        let json: serde_json::Value = serde_json::to_value(&m).unwrap();
        assert_eq!(json["type"], "rotate");
        assert_eq!(json["parameters"]["axis"], "z");
        assert_eq!(json["parameters"]["angle"], 1.0);
        assert!(json["description"].is_string());
    }

    #[test]
    fn test_translate_defaults_missing_axes() {
        let m = Modification::from_json(r#"{"type":"translate","parameters":{"x":1.0}}"#).unwrap();
        assert_eq!(
            m.kind,
            ModificationKind::Translate {
                x: 1.0,
                y: 0.0,
                z: 0.0
            }
        );
    }

    #[test]
    fn test_unknown_axis_reads_as_y() {
        let m = Modification::from_json(
            r#"{"type":"rotate","parameters":{"axis":"w","angle":0.5},"description":"r"}"#,
        )
        .unwrap();
        assert!(matches!(m.kind, ModificationKind::Rotate { axis: Axis::Y, .. }));
    }

    #[test]
    fn test_unknown_type_is_none() {
        assert!(Modification::from_json(r#"{"type":"explode","parameters":{}}"#).is_none());
    }

    #[test]
    fn test_unit_variant_without_parameters() {
        let m = Modification::from_json(r#"{"type":"reset","description":"r","timestamp":5}"#)
            .unwrap();
        assert_eq!(m.kind, ModificationKind::Reset);
        assert_eq!(m.timestamp, 5);
    }

    #[test]
    fn test_add_primitive_roundtrip() {
        let m = Modification::new(ModificationKind::AddPrimitive(PrimitiveSpec::new(
            PrimitiveKind::Torus,
        )));
        let json = m.to_json().unwrap();
        assert!(json.contains(r#""primitive":"torus""#));
        assert_eq!(Modification::from_json(&json).unwrap(), m);
    }
}
