//! Natural-language command parsing
//!
//! Only a fixed set of phrasings is recognised; anything else is left for
//! the remote assistant.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::geometry::{PrimitiveKind, PrimitiveSpec};
use crate::modification::{Axis, Modification, ModificationKind, ZoomDirection};

/// Factor applied by "scale up"
pub const SCALE_UP_FACTOR: f32 = 1.2;
/// Factor applied by "scale down"
pub const SCALE_DOWN_FACTOR: f32 = 0.8;

/// Turns free text into a modification
pub trait CommandParser: Send + Sync {
    fn parse(&self, text: &str) -> Option<Modification>;
}

static ZOOM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^zoom\s+(?:to\s+)?(in|out|fit)$").unwrap());
static ADD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:add|create)\s+(?:an?\s+)?(cube|box|sphere|cylinder|cone|torus)$").unwrap()
});
static SELECT_MAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^select\s+(?:the\s+)?main(?:\s+model)?$").unwrap());
static ROTATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^rotate\s+(?:it\s+)?(-?\d+(?:\.\d+)?)\s*(?:degrees?|deg|°)\s+(?:around|about)\s+(?:the\s+)?([xyz])(?:[\s-]+axis)?$",
    )
    .unwrap()
});
static SCALE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^scale\s+(?:it\s+)?(up|down)$").unwrap());
static RESET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^reset(?:\s+(?:the\s+)?(?:model|scene))?$").unwrap());

/// Fixed-pattern parser for the common viewport commands
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexCommandParser;

impl RegexCommandParser {
    pub fn new() -> Self {
        Self
    }
}

impl CommandParser for RegexCommandParser {
    fn parse(&self, text: &str) -> Option<Modification> {
        let normalized = text
            .trim()
            .trim_end_matches(['.', '!', '?'])
            .to_lowercase();
        let input = normalized.as_str();

        let kind = if let Some(caps) = ZOOM.captures(input) {
            let direction = match &caps[1] {
                "in" => ZoomDirection::In,
                "out" => ZoomDirection::Out,
                _ => ZoomDirection::Fit,
            };
            ModificationKind::Zoom { direction }
        } else if let Some(caps) = ADD.captures(input) {
            ModificationKind::AddPrimitive(PrimitiveSpec::new(PrimitiveKind::parse(&caps[1])))
        } else if SELECT_MAIN.is_match(input) {
            ModificationKind::Select {
                target: crate::constants::MAIN_TARGET.to_string(),
            }
        } else if let Some(caps) = ROTATE.captures(input) {
            let degrees: f32 = caps[1].parse().ok()?;
            ModificationKind::Rotate {
                axis: Axis::parse(&caps[2]),
                angle: degrees.to_radians(),
            }
        } else if let Some(caps) = SCALE.captures(input) {
            let factor = if &caps[1] == "up" {
                SCALE_UP_FACTOR
            } else {
                SCALE_DOWN_FACTOR
            };
            ModificationKind::Scale { factor }
        } else if RESET.is_match(input) {
            ModificationKind::Reset
        } else {
            return None;
        };

        tracing::debug!("Parsed command '{}' as {}", text, kind.type_name());
        Some(Modification::new(kind))
    }
}

/// Parse with the default fixed patterns
pub fn parse_command(text: &str) -> Option<Modification> {
    RegexCommandParser.parse(text)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn kind(text: &str) -> Option<ModificationKind> {
        parse_command(text).map(|m| m.kind)
    }

    #[test]
    fn test_zoom() {
        assert_eq!(
            kind("Zoom in"),
            Some(ModificationKind::Zoom {
                direction: ZoomDirection::In
            })
        );
        assert_eq!(
            kind("zoom to fit"),
            Some(ModificationKind::Zoom {
                direction: ZoomDirection::Fit
            })
        );
    }

    #[test]
    fn test_add_primitive() {
        match kind("add a torus") {
            Some(ModificationKind::AddPrimitive(spec)) => assert_eq!(spec.kind, PrimitiveKind::Torus),
            other => panic!("unexpected {:?}", other),
        }
        match kind("Add box.") {
            Some(ModificationKind::AddPrimitive(spec)) => assert_eq!(spec.kind, PrimitiveKind::Cube),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rotate_converts_degrees() {
        match kind("rotate 90 degrees around z") {
            Some(ModificationKind::Rotate { axis, angle }) => {
                assert_eq!(axis, Axis::Z);
                assert_relative_eq!(angle, std::f32::consts::FRAC_PI_2);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(kind("rotate -45 deg about the x axis").is_some());
    }

    #[test]
    fn test_scale_select_reset() {
        assert_eq!(kind("scale up"), Some(ModificationKind::Scale { factor: 1.2 }));
        assert_eq!(kind("scale down"), Some(ModificationKind::Scale { factor: 0.8 }));
        assert_eq!(
            kind("select main"),
            Some(ModificationKind::Select {
                target: "main".into()
            })
        );
        assert_eq!(kind("reset the model"), Some(ModificationKind::Reset));
    }

    #[test]
    fn test_unmatched_is_none() {
        assert!(kind("make it look like a chair").is_none());
        assert!(kind("add a dodecahedron").is_none());
        assert!(kind("undo").is_none());
    }
}
