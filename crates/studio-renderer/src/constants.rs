//! Global constants for studio-renderer

/// Depth buffer format used by every pipeline
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Camera distance multiplier for one "zoom in" step
pub const ZOOM_STEP: f32 = 0.8;

/// Extra margin applied by zoom-to-fit and zoom-to-selection
pub const ZOOM_FIT_PADDING: f32 = 1.2;

/// Delay between a scene change and the auto-fit camera move
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 150;

/// Tint mixed into selected objects
pub const SELECTION_TINT: [f32; 3] = [1.0, 0.65, 0.1];

/// Camera constants
pub mod camera {
    /// Default orbit distance
    pub const DEFAULT_DISTANCE: f32 = 12.0;
    /// Pitch limit in degrees, keeps the view matrix away from the pole
    pub const PITCH_LIMIT_DEGREES: f32 = 89.0;
    /// Closest orbit distance
    pub const MIN_DISTANCE: f32 = 0.1;
    /// Farthest orbit distance
    pub const MAX_DISTANCE: f32 = 10000.0;
}
