//! Body identity and metadata

use std::collections::BTreeSet;
use std::fmt;

use super::key::CellKey;
use super::params::BodyParams;

/// Body identifier. Assigned from 1 upward and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(u32);

impl BodyId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// A group of nodes sharing spring parameters
///
/// Members are owned by [`super::membership::Membership`]; the body keeps a
/// mirror of its own keys, updated only by `attach`/`detach`.
#[derive(Debug, Clone)]
pub struct Body {
    id: BodyId,
    pub params: BodyParams,
    pub(super) members: BTreeSet<CellKey>,
}

impl Body {
    pub(super) fn new(id: BodyId, params: BodyParams) -> Self {
        Self {
            id,
            params,
            members: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    /// Number of member cells
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
