//! Camera auto-fit: debounced re-framing after scene changes

use std::time::Duration;

use glam::Vec3;
use web_time::Instant;

use crate::camera::Camera;
use crate::config::AutoFitConfig;
use crate::constants::ZOOM_FIT_PADDING;
use crate::scene::BoundingBox;

/// Debounce timer; a fresh trigger replaces a pending one
#[derive(Debug, Clone)]
pub struct AutoFit {
    pending: Option<Instant>,
    delay: Duration,
}

impl AutoFit {
    /// Timer with the given settle delay
    pub fn new(delay: Duration) -> Self {
        Self {
            pending: None,
            delay,
        }
    }

    /// Timer configured from [`AutoFitConfig`]
    pub fn from_config(config: &AutoFitConfig) -> Self {
        Self::new(Duration::from_millis(config.settle_delay_ms))
    }

    /// Request a re-frame `delay` after `now`
    pub fn schedule(&mut self, now: Instant) {
        self.pending = Some(now + self.delay);
    }

    /// Drop a pending request
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Whether a request is waiting
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// `true` exactly once when the settle delay has elapsed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(deadline) if now >= deadline => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

/// Camera placement produced by framing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTarget {
    /// Eye position
    pub position: Vec3,
    /// Look-at point and orbit target
    pub target: Vec3,
}

/// Frame the union of `bounds`, plus the reference volume when configured
///
/// Returns `None` when there is nothing to frame (no objects and no reference
/// volume) or the bounds are non-finite; the camera should then be left where it is.
pub fn compute_frame(
    bounds: impl IntoIterator<Item = BoundingBox>,
    config: &AutoFitConfig,
) -> Option<FrameTarget> {
    let reference = config
        .reference_half_extents
        .map(|half| BoundingBox::from_center_half_extents(Vec3::ZERO, Vec3::from(half)))
        .unwrap_or_else(BoundingBox::empty);
    let framed = bounds
        .into_iter()
        .fold(reference, |acc, b| acc.union(&b));
    if !framed.is_valid() {
        tracing::debug!("Auto-fit skipped: nothing to frame");
        return None;
    }
    if !framed.is_finite() {
        tracing::warn!("Auto-fit skipped: non-finite scene bounds {:?}", framed);
        return None;
    }

    let center = framed.center();
    let distance = (framed.max_extent() * config.padding).max(config.min_distance);
    let direction = Vec3::from(config.direction)
        .try_normalize()
        .unwrap_or(Vec3::ONE.normalize());
    Some(FrameTarget {
        position: center + direction * distance,
        target: center,
    })
}

/// Move the camera so `bounds` fills the view, keeping the viewing direction
///
/// `distance = max_dim / sin(fov / 2) * padding`. Returns whether the camera moved.
pub fn zoom_to_bounds(camera: &mut Camera, bounds: &BoundingBox) -> bool {
    zoom_to_bounds_padded(camera, bounds, ZOOM_FIT_PADDING)
}

/// [`zoom_to_bounds`] with an explicit padding factor
pub fn zoom_to_bounds_padded(camera: &mut Camera, bounds: &BoundingBox, padding: f32) -> bool {
    if !bounds.is_valid() || !bounds.is_finite() {
        tracing::warn!("Zoom skipped: invalid bounds {:?}", bounds);
        return false;
    }
    let max_dim = bounds.max_extent().max(f32::EPSILON);
    let distance = max_dim / (camera.fov / 2.0).sin() * padding;
    let direction = (camera.position - camera.target)
        .try_normalize()
        .unwrap_or(Vec3::ONE.normalize());
    let center = bounds.center();
    camera.set_view(center + direction * distance, center);
    true
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_debounce_coalesces() {
        let mut fit = AutoFit::new(Duration::from_millis(150));
        let t0 = Instant::now();
        fit.schedule(t0);
        fit.schedule(t0 + Duration::from_millis(100));
        assert!(!fit.poll(t0 + Duration::from_millis(200)));
        assert!(fit.poll(t0 + Duration::from_millis(250)));
        assert!(!fit.poll(t0 + Duration::from_millis(300)));
    }

    #[test]
    fn test_empty_scene_has_no_frame() {
        assert!(compute_frame(std::iter::empty(), &AutoFitConfig::default()).is_none());
    }

    #[test]
    fn test_frame_distance_respects_minimum() {
        let config = AutoFitConfig::default();
        let small = BoundingBox::from_center_half_extents(Vec3::new(1.0, 0.0, 0.0), Vec3::splat(0.1));
        let frame = compute_frame([small], &config).unwrap();
        assert_eq!(frame.target, Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(
            (frame.position - frame.target).length(),
            config.min_distance,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_frame_includes_reference_volume() {
        let config = AutoFitConfig {
            reference_half_extents: Some([10.0, 10.0, 0.0]),
            ..AutoFitConfig::default()
        };
        let b = BoundingBox::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let frame = compute_frame([b], &config).unwrap();
        assert_relative_eq!(
            (frame.position - frame.target).length(),
            20.0 * config.padding,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_empty_scene_frames_reference_volume() {
        let config = AutoFitConfig {
            reference_half_extents: Some([10.0, 10.0, 0.0]),
            ..AutoFitConfig::default()
        };
        let frame = compute_frame(std::iter::empty(), &config).unwrap();
        assert_eq!(frame.target, Vec3::ZERO);
        assert_relative_eq!(
            (frame.position - frame.target).length(),
            20.0 * config.padding,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        let b = BoundingBox::new(Vec3::ZERO, Vec3::new(f32::INFINITY, 1.0, 1.0));
        assert!(compute_frame([b], &AutoFitConfig::default()).is_none());
        let mut camera = Camera::new(1.0);
        let before = camera.clone();
        assert!(!zoom_to_bounds(&mut camera, &b));
        assert_eq!(camera, before);
    }

    #[test]
    fn test_zoom_to_bounds_distance() {
        let mut camera = Camera::new(1.0);
        let b = BoundingBox::from_center_half_extents(Vec3::new(0.0, 0.0, 2.0), Vec3::ONE);
        assert!(zoom_to_bounds(&mut camera, &b));
        let expected = 2.0 / (camera.fov / 2.0).sin() * ZOOM_FIT_PADDING;
        assert_relative_eq!(camera.distance, expected, epsilon = 1e-3);
        assert_eq!(camera.target, Vec3::new(0.0, 0.0, 2.0));
    }
}
