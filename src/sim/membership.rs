//! Cell-to-body ownership
//!
//! One table decides which body a cell belongs to. Each body also keeps the
//! set of its own keys so member lookups cost only the body's size. Every
//! mutation goes through `attach`/`detach`, which update both views together.

use std::collections::BTreeMap;

use super::body::{Body, BodyId};
use super::key::CellKey;
use super::params::BodyParams;

#[derive(Debug, Clone)]
pub struct Membership {
    owner: BTreeMap<CellKey, BodyId>,
    bodies: BTreeMap<BodyId, Body>,
    next_id: u32,
}

impl Default for Membership {
    fn default() -> Self {
        Self {
            owner: BTreeMap::new(),
            bodies: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Membership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new, empty body
    pub fn create_body(&mut self, params: BodyParams) -> BodyId {
        let id = BodyId::new(self.next_id);
        self.next_id += 1;
        self.bodies.insert(id, Body::new(id, params));
        id
    }

    /// Make `key` a member of `id`, leaving any previous body.
    /// Returns false (and changes nothing) if `id` doesn't exist.
    pub fn attach(&mut self, key: CellKey, id: BodyId) -> bool {
        if !self.bodies.contains_key(&id) {
            return false;
        }
        self.detach(key);
        if let Some(body) = self.bodies.get_mut(&id) {
            body.members.insert(key);
        }
        self.owner.insert(key, id);
        true
    }

    /// Remove `key` from whatever body owns it
    pub fn detach(&mut self, key: CellKey) -> Option<BodyId> {
        let id = self.owner.remove(&key)?;
        if let Some(body) = self.bodies.get_mut(&id) {
            body.members.remove(&key);
        }
        Some(id)
    }

    /// Delete every body without members, returning their ids
    pub fn prune(&mut self) -> Vec<BodyId> {
        let empty: Vec<BodyId> = self
            .bodies
            .values()
            .filter(|b| b.is_empty())
            .map(|b| b.id())
            .collect();
        for id in &empty {
            self.bodies.remove(id);
        }
        empty
    }

    #[inline]
    pub fn body_of(&self, key: CellKey) -> Option<BodyId> {
        self.owner.get(&key).copied()
    }

    #[inline]
    pub fn is_member(&self, key: CellKey, id: BodyId) -> bool {
        self.owner.get(&key) == Some(&id)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(&id)
    }

    /// Body owning `key`, if any
    pub fn body_for_key(&self, key: CellKey) -> Option<&Body> {
        self.body_of(key).and_then(|id| self.bodies.get(&id))
    }

    /// Members of `id` in key order
    pub fn members(&self, id: BodyId) -> Vec<CellKey> {
        self.bodies
            .get(&id)
            .map(|b| b.members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn body_ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies.keys().copied()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn member_count(&self) -> usize {
        self.owner.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(x: i32, y: i32) -> CellKey {
        CellKey::new(x, y)
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut m = Membership::new();
        let a = m.create_body(BodyParams::default());
        let b = m.create_body(BodyParams::default());
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);

        m.prune();
        let c = m.create_body(BodyParams::default());
        assert_eq!(c.get(), 3);
    }

    #[test]
    fn test_attach_moves_key_between_bodies() {
        let mut m = Membership::new();
        let a = m.create_body(BodyParams::default());
        let b = m.create_body(BodyParams::default());

        assert!(m.attach(k(0, 0), a));
        assert!(m.attach(k(1, 0), a));
        assert_eq!(m.body(a).map(Body::len), Some(2));

        assert!(m.attach(k(0, 0), b));
        assert_eq!(m.body_of(k(0, 0)), Some(b));
        assert_eq!(m.body(a).map(Body::len), Some(1));
        assert_eq!(m.body(b).map(Body::len), Some(1));
        assert_eq!(m.members(a), vec![k(1, 0)]);
        assert_eq!(m.members(b), vec![k(0, 0)]);
    }

    #[test]
    fn test_members_follow_owner_table() {
        let mut m = Membership::new();
        let a = m.create_body(BodyParams::default());
        for x in 0..5 {
            m.attach(k(x, 0), a);
        }
        m.detach(k(2, 0));
        m.attach(k(2, 0), a);
        m.detach(k(4, 0));

        let members = m.members(a);
        assert_eq!(members, vec![k(0, 0), k(1, 0), k(2, 0), k(3, 0)]);
        assert!(members.iter().all(|&key| m.is_member(key, a)));
        assert_eq!(m.body(a).map(Body::len), Some(4));
        assert!(m.members(BodyId::new(99)).is_empty());
    }

    #[test]
    fn test_attach_to_missing_body_is_rejected() {
        let mut m = Membership::new();
        assert!(!m.attach(k(0, 0), BodyId::new(42)));
        assert_eq!(m.body_of(k(0, 0)), None);
    }

    #[test]
    fn test_prune_removes_only_empty_bodies() {
        let mut m = Membership::new();
        let a = m.create_body(BodyParams::default());
        let b = m.create_body(BodyParams::default());
        m.attach(k(0, 0), a);
        m.attach(k(5, 5), b);

        assert_eq!(m.detach(k(0, 0)), Some(a));
        assert_eq!(m.detach(k(0, 0)), None);
        assert_eq!(m.prune(), vec![a]);
        assert!(m.body(a).is_none());
        assert!(m.body(b).is_some());
        assert_eq!(m.body_count(), 1);
        assert_eq!(m.member_count(), 1);
    }
}
