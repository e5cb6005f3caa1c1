//! Wobble Grid - soft-body physics for a grid canvas editor
//!
//! Core modules:
//! - `sim`: Mass-spring simulation (nodes, bodies, integration, frame loop)
//! - `platform`: Browser glue (DOM offset writer, JS bindings, frame driver)
//! - `settings`: Editor physics preferences

pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::Settings;
pub use sim::{BodyId, BodyParams, BodyParamsPatch, CellKey, SoftBodyWorld};

use glam::DVec2;

/// Simulation constants
pub mod consts {
    /// Longest frame delta fed to the integrator (ms). Longer gaps (background
    /// tab, debugger pause) are treated as this.
    pub const MAX_FRAME_MS: f64 = 32.0;
    /// Nominal frame length (60 Hz), used for the first frame after waking
    pub const FRAME_DT: f64 = 1.0 / 60.0;

    /// Cell size used when the grid doesn't supply a usable one
    pub const DEFAULT_CELL_SIZE: f64 = 50.0;
    /// Zoom limits of the editor grid (pixels per cell)
    pub const MIN_CELL_SIZE: f64 = 20.0;
    pub const MAX_CELL_SIZE: f64 = 200.0;

    /// Impulse reach, in cells
    pub const IMPULSE_RADIUS_CELLS: f64 = 2.5;
    /// Default impulse strength for a jiggle
    pub const DEFAULT_IMPULSE_STRENGTH: f64 = 1.0;

    /// Default body parameters
    pub const DEFAULT_NEIGHBOR_STIFFNESS: f64 = 25.0;
    pub const DEFAULT_ANCHOR_STIFFNESS: f64 = 10.0;
    pub const DEFAULT_DAMPING: f64 = 4.0;
    /// Max wobble amplitude as a fraction of cell size
    pub const DEFAULT_MAX_OFFSET_RATIO: f64 = 0.6;
    pub const DEFAULT_MASS: f64 = 1.0;

    /// Smallest accepted node mass
    pub const MIN_MASS: f64 = 0.01;
}

/// Resting pixel-space center of a grid cell
///
/// `viewport` is the grid's global scroll offset in pixels.
#[inline]
pub fn cell_center(x: i32, y: i32, cell_size: f64, viewport: DVec2) -> DVec2 {
    DVec2::new(x as f64, y as f64) * cell_size - viewport + DVec2::splat(cell_size / 2.0)
}

/// Scale `v` down to `max_len` along its direction if it is longer
#[inline]
pub fn clamp_length(v: DVec2, max_len: f64) -> DVec2 {
    let len = v.length();
    if len > max_len && len > 0.0 {
        v * (max_len / len)
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_center() {
        let c = cell_center(0, 0, 50.0, DVec2::ZERO);
        assert_eq!(c, DVec2::new(25.0, 25.0));

        let c = cell_center(2, -1, 40.0, DVec2::new(10.0, 5.0));
        assert_eq!(c, DVec2::new(90.0, -25.0));
    }

    #[test]
    fn test_clamp_length() {
        let v = clamp_length(DVec2::new(30.0, 40.0), 10.0);
        assert!((v.length() - 10.0).abs() < 1e-12);
        assert!((v.x - 6.0).abs() < 1e-12);

        // Shorter vectors are untouched
        assert_eq!(clamp_length(DVec2::new(1.0, 1.0), 10.0), DVec2::new(1.0, 1.0));
        assert_eq!(clamp_length(DVec2::ZERO, 0.0), DVec2::ZERO);
    }
}
