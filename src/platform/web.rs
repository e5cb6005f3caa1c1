//! JavaScript binding and frame driver
//!
//! The editor's tools talk to the simulation through one `WobbleWorld`
//! object (installed as `window.SoftWorld`). Keys cross the boundary as the
//! DOM's `"x,y"` strings, parameter objects as plain JS objects.
//!
//! The world lives behind `Rc<RefCell<_>>`. JS commands and animation-frame
//! callbacks each take the borrow for their whole run, so a command is always
//! fully applied before the next frame sees the world.

use glam::DVec2;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use super::dom::DomOffsetWriter;
use super::parse_keys;
use crate::settings::Settings;
use crate::sim::{BodyId, BodyParams, BodyParamsPatch, CellKey, SoftBodyWorld};

struct Shared {
    world: RefCell<SoftBodyWorld>,
    settings: RefCell<Settings>,
    dom: RefCell<Option<DomOffsetWriter>>,
    /// A requestAnimationFrame callback is outstanding
    frame_pending: Cell<bool>,
}

/// Soft-body world handle for the editor
#[wasm_bindgen]
pub struct WobbleWorld {
    shared: Rc<Shared>,
}

impl WobbleWorld {
    pub fn from_world(world: SoftBodyWorld, settings: Settings) -> Self {
        Self {
            shared: Rc::new(Shared {
                world: RefCell::new(world),
                settings: RefCell::new(settings),
                dom: RefCell::new(DomOffsetWriter::new()),
                frame_pending: Cell::new(false),
            }),
        }
    }

    pub fn from_settings(settings: Settings) -> Self {
        Self::from_world(SoftBodyWorld::from_settings(&settings), settings)
    }

    /// Request a frame if the loop is running and none is outstanding
    fn schedule(&self) {
        let running = self.shared.world.borrow().is_running();
        if running && !self.shared.frame_pending.replace(true) {
            request_animation_frame(self.shared.clone());
        }
    }

    /// Push pending resets to the DOM without simulating
    fn publish(&self) {
        let mut world = self.shared.world.borrow_mut();
        if let Some(dom) = self.shared.dom.borrow_mut().as_mut() {
            world.publish(dom);
        }
    }
}

#[wasm_bindgen]
impl WobbleWorld {
    #[wasm_bindgen(constructor)]
    pub fn new(cell_size: f64) -> WobbleWorld {
        let mut settings = Settings::load();
        let cell_size = settings.zoom_to(cell_size);
        let world = SoftBodyWorld::with_defaults(cell_size, settings.body_defaults)
            .with_seed(settings.seed);
        Self::from_world(world, settings)
    }

    #[wasm_bindgen(js_name = groupKeys)]
    pub fn group_keys(&self, keys: Vec<String>) -> Option<u32> {
        let id = self
            .shared
            .world
            .borrow_mut()
            .group_keys(parse_keys(&keys));
        self.schedule();
        id.map(BodyId::get)
    }

    #[wasm_bindgen(js_name = ungroupKeys)]
    pub fn ungroup_keys(&self, keys: Vec<String>) {
        self.shared.world.borrow_mut().ungroup_keys(parse_keys(&keys));
    }

    #[wasm_bindgen(js_name = removeKeys)]
    pub fn remove_keys(&self, keys: Vec<String>) {
        self.shared.world.borrow_mut().remove_keys(parse_keys(&keys));
        // Reset transforms now rather than waiting for a frame that may never come
        self.publish();
    }

    /// Member keys of the body containing `key`, or `null`
    #[wasm_bindgen(js_name = getBodyKeysForKey)]
    pub fn get_body_keys_for_key(&self, key: &str) -> JsValue {
        let members = CellKey::parse(key)
            .and_then(|k| self.shared.world.borrow().body_keys_for_key(k));
        match members {
            Some(members) => members
                .iter()
                .map(|k| JsValue::from_str(&k.to_string()))
                .collect::<js_sys::Array>()
                .into(),
            None => JsValue::NULL,
        }
    }

    #[wasm_bindgen(js_name = hasBodyForKey)]
    pub fn has_body_for_key(&self, key: &str) -> bool {
        CellKey::parse(key).is_some_and(|k| self.shared.world.borrow().has_body_for_key(k))
    }

    /// `{ x, y }` offset in pixels, or `null`
    #[wasm_bindgen(js_name = getOffset)]
    pub fn get_offset(&self, key: &str) -> JsValue {
        let offset = CellKey::parse(key).and_then(|k| self.shared.world.borrow().offset(k));
        match offset {
            Some(o) => to_js(&serde_json::json!({ "x": o.x, "y": o.y })),
            None => JsValue::NULL,
        }
    }

    /// Patch a body's parameters from a plain object; unknown fields are ignored
    #[wasm_bindgen(js_name = setBodyProps)]
    pub fn set_body_props(&self, id: u32, props: JsValue) {
        let Some(patch) = from_js::<BodyParamsPatch>(&props) else {
            log::warn!("setBodyProps: unreadable props for body {}", id);
            return;
        };
        self.shared
            .world
            .borrow_mut()
            .set_body_props(BodyId::new(id), &patch);
        self.schedule();
    }

    /// Parameters of body `id`, or `null`.
    ///
    /// Output uses the long names (`neighborStiffness`, `anchorStiffness`,
    /// `maxOffsetRatio`). `setBodyProps` also accepts the short panel names
    /// `kNeighbor`, `kAnchor` and `maxOffset`, but they are never returned.
    #[wasm_bindgen(js_name = getBodyProps)]
    pub fn get_body_props(&self, id: u32) -> JsValue {
        let props = self.shared.world.borrow().body_props(BodyId::new(id));
        props_to_js(props)
    }

    #[wasm_bindgen(js_name = getBodyPropsForKey)]
    pub fn get_body_props_for_key(&self, key: &str) -> JsValue {
        let props = CellKey::parse(key).and_then(|k| self.shared.world.borrow().body_props_for_key(k));
        props_to_js(props)
    }

    /// Zoom to `size` pixels per cell, clamped to the saved zoom limits.
    /// Returns the size actually used.
    #[wasm_bindgen(js_name = setCellSize)]
    pub fn set_cell_size(&self, size: f64) -> f64 {
        let mut settings = self.shared.settings.borrow_mut();
        let size = settings.zoom_to(size);
        self.shared.world.borrow_mut().set_cell_size(size);
        settings.save();
        size
    }

    #[wasm_bindgen(js_name = setViewportOffset)]
    pub fn set_viewport_offset(&self, x: f64, y: f64) {
        self.shared
            .world
            .borrow_mut()
            .set_viewport_offset(DVec2::new(x, y));
    }

    /// Poke `keys` from screen point (`x`, `y`)
    #[wasm_bindgen(js_name = impulseAtKeys)]
    pub fn impulse_at_keys(&self, keys: Vec<String>, x: f64, y: f64, strength: f64) {
        self.shared
            .world
            .borrow_mut()
            .impulse_at_keys(parse_keys(&keys), DVec2::new(x, y), strength);
        self.schedule();
    }

    #[wasm_bindgen(js_name = jiggleBody)]
    pub fn jiggle_body(&self, id: u32, strength: f64) -> bool {
        let hit = self
            .shared
            .world
            .borrow_mut()
            .jiggle_body(BodyId::new(id), strength);
        self.schedule();
        hit
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.shared.world.borrow().is_running()
    }
}

fn request_animation_frame(shared: Rc<Shared>) {
    let Some(window) = web_sys::window() else {
        shared.frame_pending.set(false);
        return;
    };
    let closure = Closure::once(move |time: f64| {
        on_frame(shared, time);
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

fn on_frame(shared: Rc<Shared>, time: f64) {
    let outcome = {
        let mut world = shared.world.borrow_mut();
        let mut dom = shared.dom.borrow_mut();
        match dom.as_mut() {
            Some(dom) => world.frame(time, dom),
            None => world.frame(time, &mut ()),
        }
    };

    if outcome.wants_next_frame() {
        request_animation_frame(shared);
    } else {
        shared.frame_pending.set(false);
    }
}

fn props_to_js(props: Option<BodyParams>) -> JsValue {
    match props.and_then(|p| serde_json::to_value(p).ok()) {
        Some(value) => to_js(&value),
        None => JsValue::NULL,
    }
}

fn to_js(value: &serde_json::Value) -> JsValue {
    js_sys::JSON::parse(&value.to_string()).unwrap_or(JsValue::NULL)
}

fn from_js<T: serde::de::DeserializeOwned>(value: &JsValue) -> Option<T> {
    let json = js_sys::JSON::stringify(value).ok()?.as_string()?;
    serde_json::from_str(&json).ok()
}

/// Create the session's world from saved settings and expose it to the
/// editor as `window.SoftWorld`
pub fn install() -> Option<()> {
    let settings = Settings::load();
    let window = web_sys::window()?;
    log::info!(
        "Installing soft-body world (cell size {}, seed {})",
        settings.cell_size,
        settings.seed
    );
    let world = WobbleWorld::from_settings(settings);
    js_sys::Reflect::set(&window, &JsValue::from_str("SoftWorld"), &JsValue::from(world)).ok()?;
    Some(())
}
