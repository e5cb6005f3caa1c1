//! Grid cell coordinates
//!
//! Every simulated node is identified by the grid cell it sits on. The editor's
//! DOM uses `"x,y"` strings for the same thing, so keys parse from and print
//! to that format.

use std::fmt;

/// Integer grid coordinate of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub x: i32,
    pub y: i32,
}

impl CellKey {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four axis-aligned neighbors (right, left, down, up)
    pub fn neighbors4(self) -> [CellKey; 4] {
        let Self { x, y } = self;
        [
            Self::new(x.saturating_add(1), y),
            Self::new(x.saturating_sub(1), y),
            Self::new(x, y.saturating_add(1)),
            Self::new(x, y.saturating_sub(1)),
        ]
    }

    /// Parse an `"x,y"` key (whitespace around either number is allowed)
    pub fn parse(s: &str) -> Option<Self> {
        let (x, y) = s.split_once(',')?;
        Some(Self::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
    }
}

impl From<(i32, i32)> for CellKey {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(CellKey::parse("3,-4"), Some(CellKey::new(3, -4)));
        assert_eq!(CellKey::parse(" 7 , 8 "), Some(CellKey::new(7, 8)));
        assert_eq!(CellKey::parse("7"), None);
        assert_eq!(CellKey::parse("a,1"), None);
        assert_eq!(CellKey::parse("1,2,3"), None);
    }

    #[test]
    fn test_display_matches_dom_format() {
        let key = CellKey::new(-2, 15);
        assert_eq!(key.to_string(), "-2,15");
        assert_eq!(CellKey::parse(&key.to_string()), Some(key));
    }

    #[test]
    fn test_neighbors4() {
        let n = CellKey::new(0, 0).neighbors4();
        assert!(n.contains(&CellKey::new(1, 0)));
        assert!(n.contains(&CellKey::new(-1, 0)));
        assert!(n.contains(&CellKey::new(0, 1)));
        assert!(n.contains(&CellKey::new(0, -1)));
        // No diagonals
        assert!(!n.contains(&CellKey::new(1, 1)));
    }

    #[test]
    fn test_neighbors4_at_edge_does_not_overflow() {
        let n = CellKey::new(i32::MAX, i32::MIN).neighbors4();
        assert_eq!(n[0], CellKey::new(i32::MAX, i32::MIN));
        assert_eq!(n[3], CellKey::new(i32::MAX, i32::MIN));
    }
}
