//! Renderer configuration structures
//!
//! Every section deserializes with defaults so partial configuration files
//! keep working as fields are added.

use serde::{Deserialize, Serialize};

/// Ground grid configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Whether the grid is drawn
    pub enabled: bool,
    /// Grid extent (half-size in each direction)
    pub size: f32,
    /// Grid line spacing
    pub spacing: f32,
    /// Grid line color (RGB)
    pub line_color: [f32; 3],
    /// X-axis color (RGB)
    pub x_axis_color: [f32; 3],
    /// Y-axis color (RGB)
    pub y_axis_color: [f32; 3],
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 20.0,
            spacing: 1.0,
            line_color: [0.3, 0.3, 0.3],
            x_axis_color: [0.8, 0.2, 0.2],
            y_axis_color: [0.2, 0.8, 0.2],
        }
    }
}

/// Render target configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    /// Background clear color (RGBA)
    pub background_color: [f32; 4],
    /// MSAA sample count (1 = disabled, 4)
    pub msaa_sample_count: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            background_color: [0.15, 0.15, 0.18, 1.0],
            msaa_sample_count: 4,
        }
    }
}

impl ViewportConfig {
    /// Sample count clamped to the values every backend supports
    pub fn sample_count(&self) -> u32 {
        if self.msaa_sample_count >= 4 { 4 } else { 1 }
    }
}

/// Lighting configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    /// Direction the light travels from (normalized on use)
    pub direction: [f32; 3],
    /// Light color (RGB)
    pub color: [f32; 3],
    /// Light intensity multiplier
    pub intensity: f32,
    /// Ambient light color (RGB)
    pub ambient_color: [f32; 3],
    /// Ambient light strength
    pub ambient_strength: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            direction: [0.5, 0.5, 1.0],
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            ambient_color: [1.0, 1.0, 1.0],
            ambient_strength: 0.3,
        }
    }
}

/// Camera defaults and input sensitivities
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub near_plane: f32,
    /// Far clipping plane distance
    pub far_plane: f32,
    /// Pan sensitivity multiplier
    pub pan_sensitivity: f32,
    /// Zoom sensitivity multiplier
    pub zoom_sensitivity: f32,
    /// Orbit sensitivity multiplier
    pub orbit_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near_plane: 0.1,
            far_plane: 100000.0,
            pan_sensitivity: 0.002,
            zoom_sensitivity: 0.1,
            orbit_sensitivity: 0.005,
        }
    }
}

/// Camera auto-fit configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AutoFitConfig {
    /// Whether scene changes re-frame the camera
    pub enabled: bool,
    /// Delay between the last trigger and the camera move
    pub settle_delay_ms: u64,
    /// Multiplier on the largest scene extent
    pub padding: f32,
    /// Closest the camera may be placed
    pub min_distance: f32,
    /// Viewing direction from the scene center (normalized on use)
    pub direction: [f32; 3],
    /// Half-extents of a fixed volume around the origin (e.g. a build
    /// plate) that is always kept in frame
    pub reference_half_extents: Option<[f32; 3]>,
}

impl Default for AutoFitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            settle_delay_ms: crate::constants::DEFAULT_SETTLE_DELAY_MS,
            padding: 2.0,
            min_distance: 5.0,
            direction: [1.0, 1.0, 1.0],
            reference_half_extents: None,
        }
    }
}

impl AutoFitConfig {
    /// Lower, more frontal viewing angle
    pub fn low_angle() -> Self {
        Self {
            direction: [1.0, 1.0, 0.5],
            ..Self::default()
        }
    }
}

/// Complete renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RendererConfig {
    /// Grid settings
    pub grid: GridConfig,
    /// Render target settings
    pub viewport: ViewportConfig,
    /// Lighting settings
    pub lighting: LightingConfig,
    /// Camera settings
    pub camera: CameraConfig,
    /// Auto-fit settings
    pub autofit: AutoFitConfig,
    /// Maximum number of undoable modifications
    pub history_capacity: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            viewport: ViewportConfig::default(),
            lighting: LightingConfig::default(),
            camera: CameraConfig::default(),
            autofit: AutoFitConfig::default(),
            history_capacity: studio_core::DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl RendererConfig {
    /// Create a new renderer configuration with default values
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RendererConfig =
            serde_json::from_str(r#"{"autofit":{"settle_delay_ms":300}}"#).unwrap();
        assert_eq!(config.autofit.settle_delay_ms, 300);
        assert_eq!(config.autofit.padding, AutoFitConfig::default().padding);
        assert_eq!(config.grid, GridConfig::default());
        assert_eq!(config.history_capacity, 100);
    }

    #[test]
    fn test_sample_count_clamped() {
        let mut viewport = ViewportConfig::default();
        viewport.msaa_sample_count = 8;
        assert_eq!(viewport.sample_count(), 4);
        viewport.msaa_sample_count = 2;
        assert_eq!(viewport.sample_count(), 1);
    }
}
