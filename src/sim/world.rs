//! The simulation world
//!
//! Owns every node and body, applies commands from the editing tools and
//! answers the renderer's queries. All commands are total: unknown keys and
//! ids are ignored, and bad numbers are sanitized rather than rejected.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::collections::{BTreeMap, BTreeSet};

use super::body::BodyId;
use super::key::CellKey;
use super::membership::Membership;
use super::node::Node;
use super::params::{BodyParams, BodyParamsPatch};
use super::schedule::{FrameLoop, FrameOutcome, LoopState};
use super::sink::OffsetSink;
use super::tick::{StepContext, integrate};
use crate::cell_center;
use crate::consts::*;
use crate::settings::Settings;

/// Mass-spring world for one editing session
#[derive(Debug, Clone)]
pub struct SoftBodyWorld {
    nodes: BTreeMap<CellKey, Node>,
    membership: Membership,
    /// Pixels per grid cell
    cell_size: f64,
    /// Grid scroll offset (pixels), used for world-space centers
    viewport: DVec2,
    /// Parameters given to new bodies
    defaults: BodyParams,
    frames: FrameLoop,
    /// Removed keys whose visuals still need resetting
    released: Vec<CellKey>,
    rng: Pcg32,
}

impl SoftBodyWorld {
    /// Create an empty world for a grid with the given cell size
    pub fn new(cell_size: f64) -> Self {
        Self::with_defaults(cell_size, BodyParams::default())
    }

    pub fn with_defaults(cell_size: f64, defaults: BodyParams) -> Self {
        let cell_size = if valid_cell_size(cell_size) {
            cell_size
        } else {
            log::warn!("Invalid cell size {}, using {}", cell_size, DEFAULT_CELL_SIZE);
            DEFAULT_CELL_SIZE
        };
        Self {
            nodes: BTreeMap::new(),
            membership: Membership::new(),
            cell_size,
            viewport: DVec2::ZERO,
            defaults: defaults.sanitized(&BodyParams::default()),
            frames: FrameLoop::new(),
            released: Vec::new(),
            rng: Pcg32::seed_from_u64(0),
        }
    }

    /// Create a world from editor settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_defaults(settings.cell_size, settings.body_defaults).with_seed(settings.seed)
    }

    /// Reseed the RNG used by [`Self::jiggle_body`]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Pcg32::seed_from_u64(seed);
        self
    }

    // === Grouping ===

    /// Group `keys` into a new body.
    ///
    /// Keys already in another body move over with their current motion.
    /// Returns `None` if `keys` is empty.
    pub fn group_keys(&mut self, keys: impl IntoIterator<Item = CellKey>) -> Option<BodyId> {
        let keys: BTreeSet<CellKey> = keys.into_iter().collect();
        if keys.is_empty() {
            return None;
        }

        for &key in &keys {
            self.membership.detach(key);
        }
        self.prune();

        let id = self.membership.create_body(self.defaults);
        for &key in &keys {
            self.membership.attach(key, id);
            let mass = self.defaults.mass;
            let node = self.nodes.entry(key).or_insert_with(|| Node::new(key, mass));
            // Members always carry their body's mass
            node.mass = mass;
        }

        log::info!("Created {} with {} cells", id, keys.len());
        self.wake();
        Some(id)
    }

    /// Detach `keys` from their bodies but keep their nodes (and motion)
    pub fn ungroup_keys(&mut self, keys: impl IntoIterator<Item = CellKey>) {
        for key in keys {
            self.membership.detach(key);
        }
        self.prune();
    }

    /// Stop simulating `keys` entirely. Their offsets are dropped and the
    /// renderer is told to reset them on the next publish.
    pub fn remove_keys(&mut self, keys: impl IntoIterator<Item = CellKey>) {
        for key in keys {
            let was_member = self.membership.detach(key).is_some();
            let had_node = self.nodes.remove(&key).is_some();
            if was_member || had_node {
                self.released.push(key);
            }
        }
        self.prune();
    }

    /// All members of the body containing `key`, in key order
    pub fn body_keys_for_key(&self, key: CellKey) -> Option<Vec<CellKey>> {
        let id = self.membership.body_of(key)?;
        Some(self.membership.members(id))
    }

    pub fn has_body_for_key(&self, key: CellKey) -> bool {
        self.membership.body_of(key).is_some()
    }

    pub fn body_for_key(&self, key: CellKey) -> Option<BodyId> {
        self.membership.body_of(key)
    }

    /// Current displacement of `key`'s node
    pub fn offset(&self, key: CellKey) -> Option<DVec2> {
        self.nodes.get(&key).map(|n| n.offset)
    }

    pub fn velocity(&self, key: CellKey) -> Option<DVec2> {
        self.nodes.get(&key).map(|n| n.velocity)
    }

    pub fn node(&self, key: CellKey) -> Option<&Node> {
        self.nodes.get(&key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (CellKey, &Node)> + '_ {
        self.nodes.iter().map(|(k, n)| (*k, n))
    }

    pub fn body_ids(&self) -> Vec<BodyId> {
        self.membership.body_ids().collect()
    }

    pub fn body_count(&self) -> usize {
        self.membership.body_count()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // === Parameters ===

    /// Patch a body's parameters. A new mass is copied onto every member node.
    pub fn set_body_props(&mut self, id: BodyId, patch: &BodyParamsPatch) {
        let Some(body) = self.membership.body_mut(id) else {
            log::debug!("set_body_props: unknown {}", id);
            return;
        };
        if body.params.apply(patch) {
            let mass = body.params.mass;
            for key in self.membership.members(id) {
                if let Some(node) = self.nodes.get_mut(&key) {
                    node.mass = mass;
                }
            }
        }
        log::debug!("Updated {}: {:?}", id, patch);
        self.wake();
    }

    pub fn body_props(&self, id: BodyId) -> Option<BodyParams> {
        self.membership.body(id).map(|b| b.params)
    }

    pub fn body_props_for_key(&self, key: CellKey) -> Option<BodyParams> {
        self.membership.body_for_key(key).map(|b| b.params)
    }

    pub fn defaults(&self) -> BodyParams {
        self.defaults
    }

    /// Change the parameters given to bodies created from now on
    pub fn set_defaults(&mut self, defaults: BodyParams) {
        self.defaults = defaults.sanitized(&self.defaults);
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Zoom: rescale every offset and velocity by `size / old_size` so the
    /// wobble keeps its proportions relative to the cells.
    pub fn set_cell_size(&mut self, size: f64) {
        if !valid_cell_size(size) {
            log::warn!("Ignoring invalid cell size {}", size);
            return;
        }
        let scale = size / self.cell_size;
        for node in self.nodes.values_mut() {
            node.rescale(scale);
        }
        self.cell_size = size;
    }

    pub fn viewport_offset(&self) -> DVec2 {
        self.viewport
    }

    /// Grid scroll offset in pixels
    pub fn set_viewport_offset(&mut self, offset: DVec2) {
        if offset.is_finite() {
            self.viewport = offset;
        } else {
            log::warn!("Ignoring non-finite viewport offset {:?}", offset);
        }
    }

    // === Impulses ===

    /// Radial "poke" at `origin` (pixels, same space as the viewport).
    ///
    /// Each node within `2.5` cells of the origin gets an outward velocity
    /// kick of `strength * (1 - d / radius) * cell_size`. A node centered
    /// exactly on the origin is kicked upward.
    pub fn impulse_at_keys(
        &mut self,
        keys: impl IntoIterator<Item = CellKey>,
        origin: DVec2,
        strength: f64,
    ) {
        if !origin.is_finite() || !strength.is_finite() {
            log::warn!("Ignoring impulse at {:?} with strength {}", origin, strength);
            return;
        }
        let cs = self.cell_size;
        let radius = cs * IMPULSE_RADIUS_CELLS;
        let keys: BTreeSet<CellKey> = keys.into_iter().collect();

        let mut hit = 0;
        for key in keys {
            let Some(node) = self.nodes.get_mut(&key) else {
                continue;
            };
            let base = node.base();
            let delta = cell_center(base.x, base.y, cs, self.viewport) - origin;
            let dist = delta.length();
            if dist > radius {
                continue;
            }
            let dir = if dist > 0.0 { delta / dist } else { DVec2::NEG_Y };
            let falloff = 1.0 - dist / radius;
            node.velocity += dir * (strength * falloff * cs);
            hit += 1;
        }

        log::debug!("Impulse at ({:.1}, {:.1}) moved {} nodes", origin.x, origin.y, hit);
        self.wake();
    }

    /// Poke a whole body from a random spot near one of its cells.
    /// Returns false if `id` doesn't exist.
    pub fn jiggle_body(&mut self, id: BodyId, strength: f64) -> bool {
        let members = self.membership.members(id);
        if members.is_empty() {
            return false;
        }
        let pick = members[self.rng.random_range(0..members.len())];
        let half = self.cell_size / 2.0;
        let jitter = DVec2::new(
            self.rng.random_range(-half..=half),
            self.rng.random_range(-half..=half),
        );
        let origin = cell_center(pick.x, pick.y, self.cell_size, self.viewport) + jitter;
        self.impulse_at_keys(members, origin, strength);
        true
    }

    // === Frame loop ===

    pub fn loop_state(&self) -> LoopState {
        self.frames.state()
    }

    pub fn is_running(&self) -> bool {
        self.frames.is_running()
    }

    /// Wake the frame loop. Returns true if it was dormant, meaning the
    /// driver has to request a frame.
    pub fn wake(&mut self) -> bool {
        let woke = self.frames.wake();
        if woke {
            log::info!("Frame loop started ({} bodies)", self.body_count());
        }
        woke
    }

    /// Run one display frame at `now_ms`: integrate, publish offsets to
    /// `sink`, and report whether another frame is wanted.
    ///
    /// A dormant loop still flushes keys released by [`Self::remove_keys`].
    /// When the last body is gone, leftover ungrouped nodes snap back to
    /// rest before the loop stops.
    pub fn frame(&mut self, now_ms: f64, sink: &mut impl OffsetSink) -> FrameOutcome {
        let Some(dt) = self.frames.begin_frame(now_ms) else {
            self.flush_released(sink);
            return FrameOutcome::Idle;
        };
        self.step(dt);
        let bodies_remaining = self.body_count() > 0;
        if !bodies_remaining {
            self.settle_all();
        }
        self.publish(sink);
        self.frames.end_frame(bodies_remaining)
    }

    /// Advance the simulation by `dt` seconds without touching the loop state
    pub fn step(&mut self, dt: f64) {
        let ctx = StepContext {
            membership: &self.membership,
            defaults: &self.defaults,
            cell_size: self.cell_size,
        };
        integrate(&mut self.nodes, &ctx, dt);
    }

    /// Send pending resets and every node's current offset to `sink`
    pub fn publish(&mut self, sink: &mut impl OffsetSink) {
        self.flush_released(sink);
        for (key, node) in &self.nodes {
            sink.apply(*key, node.offset);
        }
    }

    fn flush_released(&mut self, sink: &mut impl OffsetSink) {
        for key in self.released.drain(..) {
            // Removed and re-grouped before the renderer caught up
            if !self.nodes.contains_key(&key) {
                sink.clear(key);
            }
        }
    }

    /// Put every node back at rest
    fn settle_all(&mut self) {
        let moving = self
            .nodes
            .values()
            .filter(|n| n.offset != DVec2::ZERO || n.velocity != DVec2::ZERO)
            .count();
        if moving > 0 {
            log::debug!("Settling {} ungrouped nodes", moving);
        }
        for node in self.nodes.values_mut() {
            node.settle();
        }
    }

    fn prune(&mut self) {
        for id in self.membership.prune() {
            log::info!("Removed empty {}", id);
        }
    }
}

fn valid_cell_size(size: f64) -> bool {
    size.is_finite() && size > 0.0
}
