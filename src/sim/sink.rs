//! Renderer boundary
//!
//! The simulation never draws. After each frame it hands offsets to an
//! [`OffsetSink`]; the browser build writes CSS transforms, tests and the
//! native demo collect them into an [`OffsetBuffer`].

use glam::DVec2;
use std::collections::BTreeMap;

use super::key::CellKey;

/// Receives per-cell visual offsets
pub trait OffsetSink {
    /// Translate `key`'s cell by `offset` pixels
    fn apply(&mut self, key: CellKey, offset: DVec2);
    /// Reset `key`'s cell to its neutral (untranslated) position
    fn clear(&mut self, key: CellKey);
}

/// Discards everything
impl OffsetSink for () {
    fn apply(&mut self, _key: CellKey, _offset: DVec2) {}
    fn clear(&mut self, _key: CellKey) {}
}

/// Latest offset of every cell, as a renderer would see it
#[derive(Debug, Clone, Default)]
pub struct OffsetBuffer {
    pub offsets: BTreeMap<CellKey, DVec2>,
    /// Number of `clear` calls received
    pub cleared: usize,
}

impl OffsetBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset currently shown for `key` (zero when neutral)
    pub fn get(&self, key: CellKey) -> DVec2 {
        self.offsets.get(&key).copied().unwrap_or(DVec2::ZERO)
    }

    /// Largest displacement currently shown
    pub fn max_offset(&self) -> f64 {
        self.offsets.values().map(|o| o.length()).fold(0.0, f64::max)
    }
}

impl OffsetSink for OffsetBuffer {
    fn apply(&mut self, key: CellKey, offset: DVec2) {
        self.offsets.insert(key, offset);
    }

    fn clear(&mut self, key: CellKey) {
        self.offsets.remove(&key);
        self.cleared += 1;
    }
}
