//! Platform abstraction layer
//!
//! Browser glue around the simulation:
//! - `dom`: writes offsets onto grid cell elements as CSS transforms
//! - `web`: the `WobbleWorld` JS class and the requestAnimationFrame driver
//!
//! Native builds have no platform layer; they drive the world with
//! [`crate::sim::FixedStepDriver`].

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::sim::CellKey;

/// Parse DOM `"x,y"` keys, skipping (and logging) malformed ones
pub fn parse_keys<S: AsRef<str>>(keys: &[S]) -> Vec<CellKey> {
    keys.iter()
        .filter_map(|s| {
            let key = CellKey::parse(s.as_ref());
            if key.is_none() {
                log::warn!("Skipping malformed cell key {:?}", s.as_ref());
            }
            key
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys_skips_garbage() {
        let keys = parse_keys(&["0,0", "bogus", "3,-1", ""]);
        assert_eq!(keys, vec![CellKey::new(0, 0), CellKey::new(3, -1)]);
    }
}
