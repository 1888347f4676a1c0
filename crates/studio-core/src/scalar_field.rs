//! Per-vertex scalar overlays (e.g. CFD pressure or velocity magnitude)

use serde::{Deserialize, Serialize};

/// Scalar values aligned with an object's vertices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarField {
    /// Display label such as "pressure"
    pub name: String,
    pub values: Vec<f32>,
    /// Explicit color range; derived from the values when absent
    #[serde(default)]
    pub range: Option<(f32, f32)>,
}

impl ScalarField {
    pub fn new(name: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            values,
            range: None,
        }
    }

    /// Min/max over finite values
    pub fn value_range(&self) -> Option<(f32, f32)> {
        if let Some(range) = self.range {
            return Some(range);
        }
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Per-vertex RGBA colors for a mesh with `vertex_count` vertices
    ///
    /// Returns `None` and logs a warning when the lengths disagree, so the
    /// overlay simply isn't drawn.
    pub fn vertex_colors(&self, vertex_count: usize) -> Option<Vec<[f32; 4]>> {
        if self.values.len() != vertex_count {
            tracing::warn!(
                "Scalar field '{}' has {} values for {} vertices, skipping overlay",
                self.name,
                self.values.len(),
                vertex_count
            );
            return None;
        }
        let (lo, hi) = self.value_range()?;
        let span = hi - lo;
        Some(
            self.values
                .iter()
                .map(|&v| {
                    let t = if span.abs() > f32::EPSILON && v.is_finite() {
                        (v - lo) / span
                    } else {
                        0.5
                    };
                    colormap(t)
                })
                .collect(),
        )
    }
}

/// Blue → cyan → green → yellow → red ramp over `t` in `[0, 1]`
pub fn colormap(t: f32) -> [f32; 4] {
    let t = t.clamp(0.0, 1.0);
    let r = (4.0 * t - 2.0).clamp(0.0, 1.0);
    let g = if t < 0.5 {
        (4.0 * t).clamp(0.0, 1.0)
    } else {
        (4.0 - 4.0 * t).clamp(0.0, 1.0)
    };
    let b = (2.0 - 4.0 * t).clamp(0.0, 1.0);
    [r, g, b, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colormap_endpoints() {
        assert_eq!(colormap(0.0), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(colormap(1.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(colormap(0.5)[1], 1.0);
    }

    #[test]
    fn test_mismatched_length_renders_nothing() {
        let field = ScalarField::new("pressure", vec![0.0, 1.0]);
        assert!(field.vertex_colors(3).is_none());
    }

    #[test]
    fn test_colors_follow_range() {
        let field = ScalarField::new("speed", vec![10.0, 20.0, 15.0]);
        let colors = field.vertex_colors(3).unwrap();
        assert_eq!(colors[0], colormap(0.0));
        assert_eq!(colors[1], colormap(1.0));
        assert_eq!(colors[2], colormap(0.5));
    }

    #[test]
    fn test_constant_field_is_mid_color() {
        let field = ScalarField::new("flat", vec![3.0; 4]);
        let colors = field.vertex_colors(4).unwrap();
        assert!(colors.iter().all(|c| *c == colormap(0.5)));
    }
}
