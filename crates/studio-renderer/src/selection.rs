//! Point and bounding-box selection
//!
//! The engine is a small state machine over pointer input. It never touches
//! the scene store; it answers "which ids" and leaves applying the result to
//! the viewport.

use glam::{Mat4, Vec2};
use studio_core::{Geometry, ObjectId};

use crate::camera::Camera;
use crate::scene::{BoundingBox, Ray, ray_geometry_intersection};

/// Active selection mode; the two are mutually exclusive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// Click picks the nearest object under the pointer
    #[default]
    Point,
    /// Drag a marquee; objects with any bounding-box corner inside are selected
    BoundingBox,
}

/// Rectangle in normalized device coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NdcRect {
    /// Lower-left corner
    pub min: Vec2,
    /// Upper-right corner
    pub max: Vec2,
}

impl NdcRect {
    /// Rectangle spanning two arbitrary corners
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Zero-area rectangles select nothing
    pub fn has_area(&self) -> bool {
        self.max.x > self.min.x && self.max.y > self.min.y
    }

    /// Inclusive containment test
    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Marquee rectangle in viewport pixels, for the overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marquee {
    /// Where the drag started
    pub start: Vec2,
    /// Current pointer position
    pub current: Vec2,
}

impl Marquee {
    /// Top-left and bottom-right corners in pixels
    pub fn rect(&self) -> (Vec2, Vec2) {
        (self.start.min(self.current), self.start.max(self.current))
    }
}

/// Something the selection engine can test against
#[derive(Debug, Clone, Copy)]
pub struct Pickable<'a> {
    /// Object id
    pub id: &'a ObjectId,
    /// World transform
    pub model: Mat4,
    /// Object-space geometry, when resolved
    pub geometry: Option<&'a Geometry>,
    /// Object-space bounds
    pub local_bounds: BoundingBox,
}

impl Pickable<'_> {
    /// World-space axis-aligned bounds
    pub fn world_bounds(&self) -> BoundingBox {
        self.local_bounds.transform(&self.model)
    }
}

/// Selection state machine
#[derive(Debug, Default)]
pub struct SelectionEngine {
    mode: SelectionMode,
    drag: Option<Marquee>,
}

impl SelectionEngine {
    /// Point mode, no drag in progress
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Switch mode, abandoning any drag in progress
    pub fn set_mode(&mut self, mode: SelectionMode) {
        if self.mode != mode {
            tracing::debug!("Selection mode {:?} -> {:?}", self.mode, mode);
            self.drag = None;
            self.mode = mode;
        }
    }

    /// `None` toggles, `Some(true)` enables box selection
    pub fn set_box_mode(&mut self, enabled: Option<bool>) {
        let enable = enabled.unwrap_or(self.mode == SelectionMode::Point);
        self.set_mode(if enable {
            SelectionMode::BoundingBox
        } else {
            SelectionMode::Point
        });
    }

    /// Whether a click should run point picking
    ///
    /// Suppressed in box mode and while a marquee drag is active.
    pub fn accepts_click(&self) -> bool {
        self.mode == SelectionMode::Point && self.drag.is_none()
    }

    /// Whether a marquee drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Current marquee, for drawing the overlay
    pub fn marquee(&self) -> Option<Marquee> {
        self.drag
    }

    /// Start a marquee drag (box mode only); returns whether it started
    pub fn begin_drag(&mut self, pixel: Vec2) -> bool {
        if self.mode != SelectionMode::BoundingBox {
            return false;
        }
        self.drag = Some(Marquee {
            start: pixel,
            current: pixel,
        });
        true
    }

    /// Track the pointer during a drag
    pub fn update_drag(&mut self, pixel: Vec2) {
        if let Some(drag) = &mut self.drag {
            drag.current = pixel;
        }
    }

    /// Finish the drag, returning the NDC rectangle to test
    ///
    /// `viewport` is the viewport size in pixels.
    pub fn end_drag(&mut self, pixel: Vec2, viewport: Vec2) -> Option<NdcRect> {
        let drag = self.drag.take()?;
        let to_ndc = |p: Vec2| {
            let (x, y) = Camera::screen_to_ndc(p.x, p.y, viewport.x, viewport.y);
            Vec2::new(x, y)
        };
        Some(NdcRect::from_corners(to_ndc(drag.start), to_ndc(pixel)))
    }

    /// Abandon a drag without selecting
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }
}

/// Nearest object hit by the ray
///
/// Objects without resolved geometry are tested against their bounds only.
pub fn pick<'a>(ray: &Ray, objects: impl IntoIterator<Item = Pickable<'a>>) -> Option<ObjectId> {
    let mut best: Option<(f32, &ObjectId)> = None;
    for object in objects {
        if object
            .world_bounds()
            .intersect_ray(ray.origin, ray.direction)
            .is_none()
        {
            continue;
        }
        let hit = match object.geometry {
            Some(geometry) => ray_geometry_intersection(ray, &object.model, geometry),
            None => object
                .world_bounds()
                .intersect_ray(ray.origin, ray.direction),
        };
        if let Some(t) = hit
            && best.is_none_or(|(best_t, _)| t < best_t)
        {
            best = Some((t, object.id));
        }
    }
    best.map(|(_, id)| id.clone())
}

/// Objects whose projected world bounds touch the rectangle
///
/// An object is selected when ANY of its eight world-space bounding-box
/// corners projects inside `rect` (inclusive). This over-selects thin
/// diagonal objects and misses objects whose box straddles the rectangle
/// without a corner inside it; corners behind the camera are ignored.
pub fn objects_in_rect<'a>(
    camera: &Camera,
    rect: NdcRect,
    objects: impl IntoIterator<Item = Pickable<'a>>,
) -> Vec<ObjectId> {
    if !rect.has_area() {
        return Vec::new();
    }
    let view_proj = camera.view_projection();
    objects
        .into_iter()
        .filter(|object| {
            let bounds = object.world_bounds();
            bounds.is_valid()
                && bounds.corners().iter().any(|corner| {
                    let clip = view_proj * corner.extend(1.0);
                    clip.w > 0.0 && rect.contains(Vec2::new(clip.x / clip.w, clip.y / clip.w))
                })
        })
        .map(|object| object.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn unit_box() -> BoundingBox {
        BoundingBox::new(Vec3::splat(-0.5), Vec3::splat(0.5))
    }

    fn front_camera() -> Camera {
        let mut camera = Camera::new(1.0);
        camera.set_view(Vec3::new(0.0, -20.0, 0.0), Vec3::ZERO);
        camera
    }

    #[test]
    fn test_mode_toggle_and_click_suppression() {
        let mut engine = SelectionEngine::new();
        assert!(engine.accepts_click());
        assert!(!engine.begin_drag(Vec2::ZERO));

        engine.set_box_mode(None);
        assert_eq!(engine.mode(), SelectionMode::BoundingBox);
        assert!(!engine.accepts_click());
        assert!(engine.begin_drag(Vec2::new(10.0, 10.0)));
        assert!(engine.is_dragging());

        engine.set_box_mode(Some(false));
        assert!(!engine.is_dragging());
        assert!(engine.accepts_click());
    }

    #[test]
    fn test_zero_area_drag_selects_nothing() {
        let a: ObjectId = "a".into();
        let objects = [Pickable {
            id: &a,
            model: Mat4::IDENTITY,
            geometry: None,
            local_bounds: unit_box(),
        }];
        let mut engine = SelectionEngine::new();
        engine.set_mode(SelectionMode::BoundingBox);
        engine.begin_drag(Vec2::new(50.0, 50.0));
        let rect = engine
            .end_drag(Vec2::new(50.0, 50.0), Vec2::new(100.0, 100.0))
            .unwrap();
        assert!(objects_in_rect(&front_camera(), rect, objects).is_empty());
    }

    #[test]
    fn test_pick_nearest() {
        let (near, far): (ObjectId, ObjectId) = ("near".into(), "far".into());
        let objects = [
            Pickable {
                id: &far,
                model: Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)),
                geometry: None,
                local_bounds: unit_box(),
            },
            Pickable {
                id: &near,
                model: Mat4::IDENTITY,
                geometry: None,
                local_bounds: unit_box(),
            },
        ];
        let camera = front_camera();
        let ray = camera.screen_to_ray(50.0, 50.0, 100.0, 100.0);
        assert_eq!(pick(&ray, objects), Some(near.clone()));

        let miss = camera.screen_to_ray(0.0, 0.0, 100.0, 100.0);
        assert_eq!(pick(&miss, objects), None);
    }

    #[test]
    fn test_marquee_rect_normalized() {
        let marquee = Marquee {
            start: Vec2::new(30.0, 5.0),
            current: Vec2::new(10.0, 20.0),
        };
        assert_eq!(marquee.rect(), (Vec2::new(10.0, 5.0), Vec2::new(30.0, 20.0)));
    }
}
