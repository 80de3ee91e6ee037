//! Collection type aliases shared by the core crates.
//!
//! Mirrors the teacher workspace's `collections` crate: fast, non-DoS-hardened
//! hashing for internal maps/sets, plus insertion-ordered maps where display
//! order matters.

pub use indexmap::{IndexMap, IndexSet};
pub use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;

pub type HashMap<K, V> = std::collections::HashMap<K, V, BuildHasherDefault<FxHasher>>;
pub type HashSet<K> = std::collections::HashSet<K, BuildHasherDefault<FxHasher>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fx_hash_map_is_usable_as_a_normal_map() {
        let mut map: HashMap<u32, &str> = HashMap::default();
        map.insert(1, "one");
        map.insert(2, "two");
        assert_eq!(map.get(&1), Some(&"one"));
        assert_eq!(map.len(), 2);
    }
}
