//! Integration step
//!
//! Advances every node by one frame: neighbor springs inside a body, an
//! anchor spring back to rest, velocity damping, semi-implicit Euler, then
//! the per-body displacement clamp.

use glam::DVec2;
use std::collections::BTreeMap;

use super::key::CellKey;
use super::membership::Membership;
use super::node::Node;
use super::params::BodyParams;
use crate::clamp_length;

/// Everything the step reads besides the nodes themselves
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub membership: &'a Membership,
    /// Parameters for nodes that belong to no body
    pub defaults: &'a BodyParams,
    pub cell_size: f64,
}

impl StepContext<'_> {
    /// Effective parameters for the node on `key`
    fn params_for(&self, key: CellKey) -> &BodyParams {
        self.membership
            .body_for_key(key)
            .map(|b| &b.params)
            .unwrap_or(self.defaults)
    }
}

/// Spring + damping force on the node at `key`
///
/// Only neighbors owned by the same body pull on the node.
pub fn node_force(
    nodes: &BTreeMap<CellKey, Node>,
    ctx: &StepContext<'_>,
    key: CellKey,
    node: &Node,
) -> DVec2 {
    let params = ctx.params_for(key);
    let mut force = DVec2::ZERO;

    if let Some(body) = ctx.membership.body_of(key) {
        for nk in key.neighbors4() {
            if nk == key || !ctx.membership.is_member(nk, body) {
                continue;
            }
            if let Some(neighbor) = nodes.get(&nk) {
                force += -params.neighbor_stiffness * (node.offset - neighbor.offset);
            }
        }
    }

    // Anchor spring back to rest
    force += -params.anchor_stiffness * node.offset;
    // Damping
    force += -params.damping * node.velocity;

    force
}

/// Advance all nodes by `dt` seconds.
///
/// Forces are evaluated from the state at the start of the step for every
/// node before any node moves, so the result doesn't depend on iteration
/// order. Returns the number of nodes that went non-finite and were reset.
pub fn integrate(nodes: &mut BTreeMap<CellKey, Node>, ctx: &StepContext<'_>, dt: f64) -> usize {
    if nodes.is_empty() || dt <= 0.0 {
        return 0;
    }

    let forces: Vec<DVec2> = nodes
        .iter()
        .map(|(key, node)| node_force(nodes, ctx, *key, node))
        .collect();

    let mut recovered = 0;
    for ((key, node), force) in nodes.iter_mut().zip(forces) {
        let params = ctx.params_for(*key);

        // Semi-implicit Euler
        node.velocity += force / node.mass * dt;
        node.offset += node.velocity * dt;

        // Clamp displacement only; momentum is kept
        node.offset = clamp_length(node.offset, params.max_offset(ctx.cell_size));

        if !node.is_finite() {
            log::warn!("Node {} diverged, resetting to rest", key);
            node.settle();
            recovered += 1;
        }
    }
    recovered
}
