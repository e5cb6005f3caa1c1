//! DOM offset writer
//!
//! Grid cells are `.grid-cell` elements tagged with `data-x`/`data-y`. Each
//! published offset becomes a `translate(...)` transform on the matching
//! element; cleared keys get their transform removed.

use glam::DVec2;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::sim::{CellKey, OffsetSink};

pub struct DomOffsetWriter {
    document: Document,
}

impl DomOffsetWriter {
    /// Writer for the current page, if there is one
    pub fn new() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self { document })
    }

    fn cell(&self, key: CellKey) -> Option<HtmlElement> {
        let selector = format!(".grid-cell[data-x=\"{}\"][data-y=\"{}\"]", key.x, key.y);
        self.document
            .query_selector(&selector)
            .ok()
            .flatten()?
            .dyn_into::<HtmlElement>()
            .ok()
    }
}

impl OffsetSink for DomOffsetWriter {
    fn apply(&mut self, key: CellKey, offset: DVec2) {
        // Cells scrolled out of view have no element
        if let Some(el) = self.cell(key) {
            let transform = format!("translate({:.2}px, {:.2}px)", offset.x, offset.y);
            let _ = el.style().set_property("transform", &transform);
        }
    }

    fn clear(&mut self, key: CellKey) {
        if let Some(el) = self.cell(key) {
            let _ = el.style().remove_property("transform");
        }
    }
}
