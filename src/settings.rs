//! Editor physics settings
//!
//! Persisted in LocalStorage, separately from the canvas document. None of
//! the live simulation state is saved; only the knobs a new session starts
//! from.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::BodyParams;

/// Physics preferences for the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Parameters given to newly grouped bodies
    pub body_defaults: BodyParams,

    // === Grid ===
    /// Initial pixel size of one cell
    pub cell_size: f64,
    /// Smallest zoom (pixels per cell)
    pub min_cell_size: f64,
    /// Largest zoom (pixels per cell)
    pub max_cell_size: f64,

    // === Interaction ===
    /// Strength of a hammer-tool poke
    pub impulse_strength: f64,
    /// Seed for the jiggle RNG
    pub seed: u64,

    // === Accessibility ===
    /// Reduced motion (much gentler pokes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            body_defaults: BodyParams::default(),

            cell_size: DEFAULT_CELL_SIZE,
            min_cell_size: MIN_CELL_SIZE,
            max_cell_size: MAX_CELL_SIZE,

            impulse_strength: DEFAULT_IMPULSE_STRENGTH,
            seed: 0,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Impulse strength after accessibility preferences
    pub fn effective_impulse_strength(&self) -> f64 {
        if self.reduced_motion {
            self.impulse_strength * 0.25
        } else {
            self.impulse_strength
        }
    }

    /// Clamp a requested zoom level to the configured limits
    pub fn clamp_cell_size(&self, size: f64) -> f64 {
        let (lo, hi) = if self.min_cell_size <= self.max_cell_size {
            (self.min_cell_size, self.max_cell_size)
        } else {
            (self.max_cell_size, self.min_cell_size)
        };
        if size.is_finite() { size.clamp(lo, hi) } else { self.cell_size }
    }

    /// Record a zoom change, returning the clamped cell size to use
    pub fn zoom_to(&mut self, size: f64) -> f64 {
        self.cell_size = self.clamp_cell_size(size);
        self.cell_size
    }

    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!("Discarding unreadable settings: {}", e);
                None
            }
        }
    }

    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "wobble_grid_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let (Some(storage), Some(json)) = (storage, self.to_json()) {
            let _ = storage.set_item(Self::STORAGE_KEY, &json);
            log::info!("Settings saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let settings = Settings {
            cell_size: 64.0,
            reduced_motion: true,
            seed: 9,
            ..Default::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json), Some(settings));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings =
            Settings::from_json(r#"{ "cellSize": 30, "bodyDefaults": { "damping": 9 } }"#).unwrap();
        assert_eq!(settings.cell_size, 30.0);
        assert_eq!(settings.body_defaults.damping, 9.0);
        assert_eq!(settings.body_defaults.neighbor_stiffness, 25.0);
        assert_eq!(settings.impulse_strength, DEFAULT_IMPULSE_STRENGTH);
        assert!(!settings.reduced_motion);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(Settings::from_json("not json"), None);
    }

    #[test]
    fn test_reduced_motion_softens_impulse() {
        let mut settings = Settings::default();
        assert_eq!(settings.effective_impulse_strength(), 1.0);
        settings.reduced_motion = true;
        assert_eq!(settings.effective_impulse_strength(), 0.25);
    }

    #[test]
    fn test_clamp_cell_size() {
        let settings = Settings::default();
        assert_eq!(settings.clamp_cell_size(5.0), 20.0);
        assert_eq!(settings.clamp_cell_size(500.0), 200.0);
        assert_eq!(settings.clamp_cell_size(62.5), 62.5);
        assert_eq!(settings.clamp_cell_size(f64::NAN), 50.0);
    }

    #[test]
    fn test_zoom_to_remembers_clamped_size() {
        let mut settings = Settings::default();
        assert_eq!(settings.zoom_to(400.0), 200.0);
        assert_eq!(settings.cell_size, 200.0);
        assert_eq!(settings.zoom_to(f64::INFINITY), 200.0);
        assert_eq!(settings.zoom_to(80.0), 80.0);

        let restored = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(restored.cell_size, 80.0);
    }
}
