//! Per-cell kinematic state

use glam::DVec2;

use super::key::CellKey;

/// A simulated point attached to one grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Cell this node belongs to; fixed at creation
    base: CellKey,
    /// Displacement from the cell's resting position (pixels)
    pub offset: DVec2,
    /// Rate of change of `offset` (pixels/s)
    pub velocity: DVec2,
    pub mass: f64,
}

impl Node {
    /// A node at rest on `base`
    pub fn new(base: CellKey, mass: f64) -> Self {
        Self {
            base,
            offset: DVec2::ZERO,
            velocity: DVec2::ZERO,
            mass,
        }
    }

    #[inline]
    pub fn base(&self) -> CellKey {
        self.base
    }

    /// Scale offset and velocity together (zoom change)
    pub fn rescale(&mut self, scale: f64) {
        self.offset *= scale;
        self.velocity *= scale;
    }

    /// Drop back to rest
    pub fn settle(&mut self) {
        self.offset = DVec2::ZERO;
        self.velocity = DVec2::ZERO;
    }

    pub fn is_finite(&self) -> bool {
        self.offset.is_finite() && self.velocity.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_at_rest() {
        let n = Node::new(CellKey::new(4, 5), 2.0);
        assert_eq!(n.base(), CellKey::new(4, 5));
        assert_eq!(n.offset, DVec2::ZERO);
        assert_eq!(n.velocity, DVec2::ZERO);
        assert_eq!(n.mass, 2.0);
    }

    #[test]
    fn test_rescale_and_settle() {
        let mut n = Node::new(CellKey::new(0, 0), 1.0);
        n.offset = DVec2::new(10.0, -2.0);
        n.velocity = DVec2::new(4.0, 0.0);
        n.rescale(0.5);
        assert_eq!(n.offset, DVec2::new(5.0, -1.0));
        assert_eq!(n.velocity, DVec2::new(2.0, 0.0));

        n.velocity.x = f64::NAN;
        assert!(!n.is_finite());
        n.settle();
        assert!(n.is_finite());
        assert_eq!(n.offset, DVec2::ZERO);
    }
}
