//! Active and finished pairing bookkeeping

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::pairing::Pairing;

/// Index over the pairings of a round.
///
/// Pairings are partitioned into *active* (unresolved) and *finished*
/// (resolved, kept in chronological completion order). An entrant has at
/// most one active pairing and any number of finished ones; a pairing is
/// never in both partitions at once.
#[derive(Debug, Clone)]
pub struct PairingIndex<E> {
    active: HashSet<Pairing<E>>,
    active_by_entrant: HashMap<E, Pairing<E>>,
    /// Finished pairings, oldest first.
    finished: Vec<Pairing<E>>,
    /// Per-entrant view of `finished`, same relative order.
    finished_by_entrant: HashMap<E, Vec<Pairing<E>>>,
}

impl<E> Default for PairingIndex<E> {
    fn default() -> Self {
        Self {
            active: HashSet::new(),
            active_by_entrant: HashMap::new(),
            finished: Vec::new(),
            finished_by_entrant: HashMap::new(),
        }
    }
}

impl<E: Clone + Eq + Hash> PairingIndex<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pairing into the active partition. Returns `false` if the
    /// index already knows this pairing in either partition.
    pub fn add(&mut self, pairing: Pairing<E>) -> bool {
        if self.contains(&pairing) {
            return false;
        }
        debug_assert!(!self.has_active_entrant(pairing.first()));
        debug_assert!(!self.has_active_entrant(pairing.second()));

        self.active_by_entrant
            .insert(pairing.first().clone(), pairing.clone());
        self.active_by_entrant
            .insert(pairing.second().clone(), pairing.clone());
        self.active.insert(pairing);
        true
    }

    /// Move a pairing from active to the tail of the finished list.
    /// Returns `false` if the pairing is not active.
    pub fn finish(&mut self, pairing: &Pairing<E>) -> bool {
        // Take the stored value so the original member orientation
        // survives even when the caller's copy is flipped.
        let Some(stored) = self.active.take(pairing) else {
            return false;
        };
        self.active_by_entrant.remove(stored.first());
        self.active_by_entrant.remove(stored.second());
        self.push_finished(stored);
        true
    }

    /// Remove a pairing from whichever partition holds it.
    pub fn remove(&mut self, pairing: &Pairing<E>) -> bool {
        self.remove_active(pairing) || self.remove_finished(pairing)
    }

    /// Remove an active pairing. Returns `false` if it is not active.
    pub fn remove_active(&mut self, pairing: &Pairing<E>) -> bool {
        let Some(stored) = self.active.take(pairing) else {
            return false;
        };
        self.active_by_entrant.remove(stored.first());
        self.active_by_entrant.remove(stored.second());
        true
    }

    /// Remove the active pairing of `entrant` and return it.
    pub fn remove_active_by_entrant(&mut self, entrant: &E) -> Option<Pairing<E>> {
        let pairing = self.active_by_entrant.get(entrant)?.clone();
        self.remove_active(&pairing);
        Some(pairing)
    }

    /// Remove a finished pairing. Returns `false` if it is not finished.
    pub fn remove_finished(&mut self, pairing: &Pairing<E>) -> bool {
        let Some(index) = self.finished.iter().position(|p| p == pairing) else {
            return false;
        };
        let stored = self.finished.remove(index);
        self.unlink_finished(stored.first(), &stored);
        self.unlink_finished(stored.second(), &stored);
        true
    }

    fn push_finished(&mut self, pairing: Pairing<E>) {
        self.finished_by_entrant
            .entry(pairing.first().clone())
            .or_default()
            .push(pairing.clone());
        self.finished_by_entrant
            .entry(pairing.second().clone())
            .or_default()
            .push(pairing.clone());
        self.finished.push(pairing);
    }

    fn unlink_finished(&mut self, entrant: &E, pairing: &Pairing<E>) {
        if let Some(list) = self.finished_by_entrant.get_mut(entrant) {
            if let Some(index) = list.iter().position(|p| p == pairing) {
                list.remove(index);
            }
            if list.is_empty() {
                self.finished_by_entrant.remove(entrant);
            }
        }
    }

    pub fn is_active(&self, pairing: &Pairing<E>) -> bool {
        self.active.contains(pairing)
    }

    pub fn is_finished(&self, pairing: &Pairing<E>) -> bool {
        self.finished_by_entrant
            .get(pairing.first())
            .map_or(false, |list| list.iter().any(|p| p == pairing))
    }

    pub fn contains(&self, pairing: &Pairing<E>) -> bool {
        self.is_active(pairing) || self.is_finished(pairing)
    }

    /// The active pairing of `entrant`, if it has one.
    pub fn find_active_by_entrant(&self, entrant: &E) -> Option<&Pairing<E>> {
        self.active_by_entrant.get(entrant)
    }

    /// All finished pairings of `entrant`, oldest first.
    pub fn find_finished_by_entrant(&self, entrant: &E) -> &[Pairing<E>] {
        match self.finished_by_entrant.get(entrant) {
            Some(list) => list,
            None => &[],
        }
    }

    /// The entrant's newest pairing on record: its active pairing if one
    /// exists, otherwise its most recently finished one.
    pub fn last_pairing_of(&self, entrant: &E) -> Option<&Pairing<E>> {
        self.active_by_entrant.get(entrant).or_else(|| {
            self.finished_by_entrant
                .get(entrant)
                .and_then(|list| list.last())
        })
    }

    pub fn has_active(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn has_active_entrant(&self, entrant: &E) -> bool {
        self.active_by_entrant.contains_key(entrant)
    }

    pub fn active(&self) -> &HashSet<Pairing<E>> {
        &self.active
    }

    /// Finished pairings in completion order, oldest first.
    pub fn finished(&self) -> &[Pairing<E>] {
        &self.finished
    }

    /// Members of active pairings, two per pairing.
    pub fn active_entrants(&self) -> impl Iterator<Item = &E> + '_ {
        self.active_by_entrant.keys()
    }

    pub fn active_entrant_count(&self) -> usize {
        self.active_by_entrant.len()
    }

    /// Lookup structures agree with the two partitions. Used by debug
    /// invariant checks only.
    pub(crate) fn partitions_consistent(&self) -> bool {
        self.active_by_entrant.len() == self.active.len() * 2
            && self.finished.iter().all(|p| !self.active.contains(p))
            && self
                .finished_by_entrant
                .values()
                .map(Vec::len)
                .sum::<usize>()
                == self.finished.len() * 2
    }
}

/// Wire form: only the two partitions are canonical, the per-entrant
/// lookups get rebuilt on load.
#[derive(Serialize, Deserialize)]
#[serde(bound(
    serialize = "E: Serialize",
    deserialize = "E: Deserialize<'de>"
))]
struct RawPairingIndex<E> {
    active: Vec<Pairing<E>>,
    finished: Vec<Pairing<E>>,
}

impl<E> Serialize for PairingIndex<E>
where
    E: Serialize + Clone + Eq + Hash,
{
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = RawPairingIndex {
            active: self.active.iter().cloned().collect(),
            finished: self.finished.clone(),
        };
        raw.serialize(serializer)
    }
}

impl<'de, E> Deserialize<'de> for PairingIndex<E>
where
    E: Deserialize<'de> + Clone + Eq + Hash,
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawPairingIndex::<E>::deserialize(deserializer)?;
        let mut index = PairingIndex::new();
        for pairing in raw.active {
            index.add(pairing);
        }
        for pairing in raw.finished {
            index.push_finished(pairing);
        }
        Ok(index)
    }
}

#[cfg(test)]
#[path = "pairing_index_tests.rs"]
mod pairing_index_tests;
