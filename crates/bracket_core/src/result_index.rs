//! Advanced/eliminated result bookkeeping

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Which of the two round results an entrant holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundResult {
    Advanced,
    Eliminated,
}

/// Two disjoint entrant sets: advanced and eliminated.
///
/// One instance is the round's live result store; a second instance serves
/// as the floating store for entrants that left the round while their
/// result still matters (see `EliminationRound`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "E: Serialize + Eq + Hash",
    deserialize = "E: Deserialize<'de> + Eq + Hash"
))]
pub struct ResultIndex<E> {
    advanced: HashSet<E>,
    eliminated: HashSet<E>,
}

impl<E> Default for ResultIndex<E> {
    fn default() -> Self {
        Self {
            advanced: HashSet::new(),
            eliminated: HashSet::new(),
        }
    }
}

impl<E: Eq + Hash> ResultIndex<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the entrant as advanced. Returns `false` if it already was.
    /// An existing eliminated record is replaced; the two sets never share
    /// an entrant.
    pub fn advance(&mut self, entrant: E) -> bool {
        self.eliminated.remove(&entrant);
        self.advanced.insert(entrant)
    }

    /// Record the entrant as eliminated. Returns `false` if it already
    /// was. An existing advanced record is replaced.
    pub fn eliminate(&mut self, entrant: E) -> bool {
        self.advanced.remove(&entrant);
        self.eliminated.insert(entrant)
    }

    pub fn contains(&self, entrant: &E) -> bool {
        self.advanced.contains(entrant) || self.eliminated.contains(entrant)
    }

    pub fn is_advanced(&self, entrant: &E) -> bool {
        self.advanced.contains(entrant)
    }

    pub fn is_eliminated(&self, entrant: &E) -> bool {
        self.eliminated.contains(entrant)
    }

    /// The result the entrant currently holds, if any.
    pub fn result_of(&self, entrant: &E) -> Option<RoundResult> {
        if self.advanced.contains(entrant) {
            Some(RoundResult::Advanced)
        } else if self.eliminated.contains(entrant) {
            Some(RoundResult::Eliminated)
        } else {
            None
        }
    }

    /// Forget the entrant's result. Returns `false` if there was none.
    pub fn reset(&mut self, entrant: &E) -> bool {
        self.advanced.remove(entrant) || self.eliminated.remove(entrant)
    }

    /// Transfer the entrant's record into `other`, preserving which result
    /// it was. Returns `false` if there was no record to move.
    pub fn move_to(&mut self, other: &mut ResultIndex<E>, entrant: &E) -> bool {
        if let Some(entrant) = self.advanced.take(entrant) {
            other.advance(entrant);
            true
        } else if let Some(entrant) = self.eliminated.take(entrant) {
            other.eliminate(entrant);
            true
        } else {
            false
        }
    }

    pub fn advanced(&self) -> &HashSet<E> {
        &self.advanced
    }

    pub fn eliminated(&self) -> &HashSet<E> {
        &self.eliminated
    }

    pub fn len(&self) -> usize {
        self.advanced.len() + self.eliminated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.advanced.is_empty() && self.eliminated.is_empty()
    }
}
