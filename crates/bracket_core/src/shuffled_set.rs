//! Uniform-random selection pool for pending entrants

use std::collections::HashMap;
use std::hash::Hash;

use rand::Rng;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A set with O(1) insertion, removal and uniform random removal.
///
/// Elements live in a vector for constant-time random indexing, with a map
/// from element to vector position; removal swaps the victim with the last
/// element. Selection is uniform over the current elements and carries no
/// bias from insertion order.
#[derive(Debug, Clone)]
pub struct ShuffledSet<E> {
    items: Vec<E>,
    positions: HashMap<E, usize>,
}

impl<E> Default for ShuffledSet<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<E: Clone + Eq + Hash> ShuffledSet<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an element. Returns `false` if it was already present.
    pub fn add(&mut self, element: E) -> bool {
        if self.positions.contains_key(&element) {
            return false;
        }
        self.positions.insert(element.clone(), self.items.len());
        self.items.push(element);
        true
    }

    /// Remove an element. Returns `false` if it was not present.
    pub fn remove(&mut self, element: &E) -> bool {
        let Some(index) = self.positions.remove(element) else {
            return false;
        };
        self.items.swap_remove(index);
        self.reindex(index);
        true
    }

    /// Remove and return an element chosen uniformly at random, or `None`
    /// if the set is empty.
    pub fn remove_random<R: Rng>(&mut self, rng: &mut R) -> Option<E> {
        if self.items.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.items.len());
        let element = self.items.swap_remove(index);
        self.positions.remove(&element);
        self.reindex(index);
        Some(element)
    }

    /// After a swap-remove, the former last element sits at `index` and
    /// its recorded position must follow.
    fn reindex(&mut self, index: usize) {
        if index < self.items.len() {
            self.positions.insert(self.items[index].clone(), index);
        }
    }

    pub fn contains(&self, element: &E) -> bool {
        self.positions.contains_key(element)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The elements, in no particular order.
    pub fn elements(&self) -> &[E] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.items.iter()
    }
}

// Only the element sequence crosses the wire; the position map is an
// internal lookup structure and gets rebuilt on load.
impl<E: Serialize> Serialize for ShuffledSet<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.items)
    }
}

impl<'de, E> Deserialize<'de> for ShuffledSet<E>
where
    E: Deserialize<'de> + Clone + Eq + Hash,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<E>::deserialize(deserializer)?;
        let mut set = ShuffledSet::new();
        for item in items {
            set.add(item);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_add_and_contains() {
        let mut set = ShuffledSet::new();
        assert!(set.add(1));
        assert!(!set.add(1));
        assert!(set.contains(&1));
        assert!(!set.contains(&2));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_keeps_positions_consistent() {
        let mut set = ShuffledSet::new();
        for i in 0..5 {
            set.add(i);
        }
        // Removing from the middle swaps the last element into the gap.
        assert!(set.remove(&1));
        assert!(!set.remove(&1));
        for i in [0, 2, 3, 4] {
            assert!(set.contains(&i));
            assert!(set.remove(&i));
        }
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_random_drains_all_elements() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut set = ShuffledSet::new();
        for i in 0..10 {
            set.add(i);
        }

        let mut drained = Vec::new();
        while let Some(element) = set.remove_random(&mut rng) {
            assert!(!set.contains(&element));
            drained.push(element);
        }

        drained.sort_unstable();
        assert_eq!(drained, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_remove_random_on_empty_set() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut set: ShuffledSet<u32> = ShuffledSet::new();
        assert_eq!(set.remove_random(&mut rng), None);
    }

    #[test]
    fn test_every_element_can_come_out_first() {
        // 500 differently seeded draws from a ten element set leave each
        // element a < 1e-22 chance of never being drawn first.
        let mut seen = std::collections::HashSet::new();
        for seed in 0..500 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut set = ShuffledSet::new();
            for i in 0..10 {
                set.add(i);
            }
            seen.insert(set.remove_random(&mut rng).unwrap());
        }
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut set = ShuffledSet::new();
        for i in 0..4 {
            set.add(i);
        }

        let json = serde_json::to_string(&set).unwrap();
        let restored: ShuffledSet<i32> = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.len(), 4);
        for i in 0..4 {
            assert!(restored.contains(&i));
        }
        // The rebuilt position map must support removal right away.
        let mut restored = restored;
        assert!(restored.remove(&2));
        assert_eq!(restored.len(), 3);
    }
}
