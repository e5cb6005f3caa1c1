//! Spring parameters shared by every node of a body

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Physical parameters of a body
///
/// Serialized in camelCase so the properties panel can hand objects straight
/// through (`{ "neighborStiffness": 25, ... }`). The panel's short names
/// (`kNeighbor`, `kAnchor`, `maxOffset`) are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BodyParams {
    /// Spring constant between adjacent members
    #[serde(alias = "kNeighbor")]
    pub neighbor_stiffness: f64,
    /// Spring constant pulling each node back to rest
    #[serde(alias = "kAnchor")]
    pub anchor_stiffness: f64,
    /// Velocity damping coefficient
    pub damping: f64,
    /// Max offset as a fraction of cell size
    #[serde(alias = "maxOffset")]
    pub max_offset_ratio: f64,
    /// Mass of each member node
    pub mass: f64,
}

impl Default for BodyParams {
    fn default() -> Self {
        Self {
            neighbor_stiffness: DEFAULT_NEIGHBOR_STIFFNESS,
            anchor_stiffness: DEFAULT_ANCHOR_STIFFNESS,
            damping: DEFAULT_DAMPING,
            max_offset_ratio: DEFAULT_MAX_OFFSET_RATIO,
            mass: DEFAULT_MASS,
        }
    }
}

impl BodyParams {
    /// Largest allowed displacement in pixels at the given cell size
    #[inline]
    pub fn max_offset(&self, cell_size: f64) -> f64 {
        self.max_offset_ratio * cell_size
    }

    /// Apply a patch field by field. Returns true if `mass` changed, since
    /// that has to be mirrored onto the member nodes.
    pub fn apply(&mut self, patch: &BodyParamsPatch) -> bool {
        let fallback = *self;
        let merged = Self {
            neighbor_stiffness: patch.neighbor_stiffness.unwrap_or(self.neighbor_stiffness),
            anchor_stiffness: patch.anchor_stiffness.unwrap_or(self.anchor_stiffness),
            damping: patch.damping.unwrap_or(self.damping),
            max_offset_ratio: patch.max_offset_ratio.unwrap_or(self.max_offset_ratio),
            mass: patch.mass.unwrap_or(self.mass),
        };
        *self = merged.sanitized(&fallback);
        self.mass != fallback.mass
    }

    /// Clamp every field into its physically usable range.
    ///
    /// Non-finite values fall back to the matching field of `fallback`.
    /// Stiffness, damping and max-offset ratio must be >= 0; mass >= `MIN_MASS`.
    pub fn sanitized(self, fallback: &BodyParams) -> Self {
        Self {
            neighbor_stiffness: sanitize_field(
                "neighborStiffness",
                self.neighbor_stiffness,
                fallback.neighbor_stiffness,
                0.0,
            ),
            anchor_stiffness: sanitize_field(
                "anchorStiffness",
                self.anchor_stiffness,
                fallback.anchor_stiffness,
                0.0,
            ),
            damping: sanitize_field("damping", self.damping, fallback.damping, 0.0),
            max_offset_ratio: sanitize_field(
                "maxOffsetRatio",
                self.max_offset_ratio,
                fallback.max_offset_ratio,
                0.0,
            ),
            mass: sanitize_field("mass", self.mass, fallback.mass, MIN_MASS),
        }
    }
}

fn sanitize_field(name: &str, value: f64, fallback: f64, min: f64) -> f64 {
    if !value.is_finite() {
        log::warn!("Ignoring non-finite {}: {}", name, value);
        return fallback.max(min);
    }
    if value < min {
        log::warn!("Clamping {} {} to {}", name, value, min);
        return min;
    }
    value
}

/// Partial update for [`BodyParams`]; `None` keeps the current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BodyParamsPatch {
    #[serde(alias = "kNeighbor")]
    pub neighbor_stiffness: Option<f64>,
    #[serde(alias = "kAnchor")]
    pub anchor_stiffness: Option<f64>,
    pub damping: Option<f64>,
    #[serde(alias = "maxOffset")]
    pub max_offset_ratio: Option<f64>,
    pub mass: Option<f64>,
}

impl BodyParamsPatch {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = BodyParams::default();
        assert_eq!(p.neighbor_stiffness, 25.0);
        assert_eq!(p.anchor_stiffness, 10.0);
        assert_eq!(p.damping, 4.0);
        assert_eq!(p.max_offset_ratio, 0.6);
        assert_eq!(p.mass, 1.0);
        assert!((p.max_offset(50.0) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_apply_keeps_unset_fields() {
        let mut p = BodyParams::default();
        let mass_changed = p.apply(&BodyParamsPatch {
            damping: Some(1.5),
            ..Default::default()
        });
        assert!(!mass_changed);
        assert_eq!(p.damping, 1.5);
        assert_eq!(p.neighbor_stiffness, 25.0);
        assert_eq!(p.mass, 1.0);

        let mass_changed = p.apply(&BodyParamsPatch {
            mass: Some(3.0),
            ..Default::default()
        });
        assert!(mass_changed);
        assert_eq!(p.mass, 3.0);
        assert_eq!(p.damping, 1.5);
    }

    #[test]
    fn test_apply_sanitizes() {
        let mut p = BodyParams::default();
        p.apply(&BodyParamsPatch {
            neighbor_stiffness: Some(-5.0),
            damping: Some(f64::NAN),
            max_offset_ratio: Some(f64::INFINITY),
            mass: Some(0.0),
            ..Default::default()
        });
        assert_eq!(p.neighbor_stiffness, 0.0);
        // Non-finite values keep the previous setting
        assert_eq!(p.damping, 4.0);
        assert_eq!(p.max_offset_ratio, 0.6);
        assert_eq!(p.mass, MIN_MASS);
    }

    #[test]
    fn test_patch_from_json() {
        let patch: BodyParamsPatch =
            serde_json::from_str(r#"{ "anchorStiffness": 3, "mass": 2.5 }"#).unwrap();
        assert_eq!(patch.anchor_stiffness, Some(3.0));
        assert_eq!(patch.mass, Some(2.5));
        assert_eq!(patch.damping, None);
        assert!(!patch.is_empty());
        assert!(BodyParamsPatch::default().is_empty());
    }

    #[test]
    fn test_patch_accepts_panel_names() {
        let patch: BodyParamsPatch =
            serde_json::from_str(r#"{ "kNeighbor": 40, "kAnchor": 5, "maxOffset": 0.3 }"#).unwrap();
        assert_eq!(patch.neighbor_stiffness, Some(40.0));
        assert_eq!(patch.anchor_stiffness, Some(5.0));
        assert_eq!(patch.max_offset_ratio, Some(0.3));
    }

    #[test]
    fn test_params_json_uses_camel_case() {
        let json = serde_json::to_string(&BodyParams::default()).unwrap();
        assert!(json.contains("\"neighborStiffness\":25.0"));
        assert!(json.contains("\"maxOffsetRatio\":0.6"));
        assert!(!json.contains("kNeighbor"));
        assert!(!json.contains("\"maxOffset\""));
    }
}
