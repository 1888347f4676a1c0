//! Surface materials and partial material updates

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Linear RGB color stored as 0..1 floats, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb`, `#rrggbb` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return Err(ColorParseError::Digit(hex.to_string()));
        }
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(ColorParseError::Length(hex.to_string())),
        };
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&expanded[range], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| ColorParseError::Digit(hex.to_string()))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(&self) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_rgba(&self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0.5, 0.5, 0.5)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// Color parse errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColorParseError {
    #[error("Expected 3 or 6 hex digits: {0}")]
    Length(String),
    #[error("Invalid hex digit in color: {0}")]
    Digit(String),
}

/// Physically based surface description
///
/// Values are not range-checked here; UI widgets clamp metalness,
/// roughness and opacity to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Material {
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub transparent: bool,
    pub opacity: f32,
    pub wireframe: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::default(),
            metalness: 0.1,
            roughness: 0.6,
            emissive: Color::BLACK,
            emissive_intensity: 0.0,
            transparent: false,
            opacity: 1.0,
            wireframe: false,
        }
    }
}

impl Material {
    /// Default material with a base color
    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// Shallow merge: every field present in `patch` overwrites this one
    pub fn merge(&mut self, patch: &MaterialPatch) {
        if let Some(v) = patch.color {
            self.color = v;
        }
        if let Some(v) = patch.metalness {
            self.metalness = v;
        }
        if let Some(v) = patch.roughness {
            self.roughness = v;
        }
        if let Some(v) = patch.emissive {
            self.emissive = v;
        }
        if let Some(v) = patch.emissive_intensity {
            self.emissive_intensity = v;
        }
        if let Some(v) = patch.transparent {
            self.transparent = v;
        }
        if let Some(v) = patch.opacity {
            self.opacity = v;
        }
        if let Some(v) = patch.wireframe {
            self.wireframe = v;
        }
    }

    /// Returns a merged copy
    pub fn merged(&self, patch: &MaterialPatch) -> Self {
        let mut material = self.clone();
        material.merge(patch);
        material
    }

    /// Alpha used for display
    pub fn effective_opacity(&self) -> f32 {
        if self.transparent { self.opacity } else { 1.0 }
    }
}

/// Partial material update; absent fields leave the target untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metalness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roughness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissive: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissive_intensity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transparent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wireframe: Option<bool>,
}

impl MaterialPatch {
    pub fn color(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_short_hex() {
        let color = Color::from_hex("#111").unwrap();
        assert_relative_eq!(color.r, 17.0 / 255.0);
        assert_eq!(color.to_hex(), "#111111");
    }

    #[test]
    fn test_long_hex_without_hash() {
        let color: Color = "ff8000".parse().unwrap();
        assert_relative_eq!(color.r, 1.0);
        assert_relative_eq!(color.g, 128.0 / 255.0);
        assert_relative_eq!(color.b, 0.0);
    }

    #[test]
    fn test_bad_hex() {
        assert!(matches!(
            Color::from_hex("#12"),
            Err(ColorParseError::Length(_))
        ));
        assert!(matches!(
            Color::from_hex("#zzzzzz"),
            Err(ColorParseError::Digit(_))
        ));
    }

    #[test]
    fn test_merge_only_touches_present_fields() {
        let mut material = Material::default();
        let patch = MaterialPatch {
            roughness: Some(0.9),
            wireframe: Some(true),
            ..Default::default()
        };
        material.merge(&patch);
        assert_eq!(material.roughness, 0.9);
        assert!(material.wireframe);
        assert_eq!(material.metalness, Material::default().metalness);
        assert_eq!(material.color, Material::default().color);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let patch = MaterialPatch::color(Color::from_hex("#111").unwrap());
        let once = Material::default().merged(&patch);
        let twice = once.merged(&patch);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_patch_json_uses_camel_case() {
        let patch: MaterialPatch =
            serde_json::from_str(r##"{"color":"#111","emissiveIntensity":2.0}"##).unwrap();
        assert_eq!(patch.emissive_intensity, Some(2.0));
        assert!(patch.color.is_some());
        assert!(patch.metalness.is_none());
    }
}
