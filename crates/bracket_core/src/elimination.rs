//! The elimination round state machine

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::RoundError;
use crate::pairing::Pairing;
use crate::pairing_index::PairingIndex;
use crate::result_index::{ResultIndex, RoundResult};
use crate::shuffled_set::ShuffledSet;

/// Bounds required of an entrant identifier.
///
/// The round treats identifiers as opaque values: they are stored,
/// compared and hashed, never inspected. Implemented automatically for
/// every type with the required bounds.
pub trait Entrant: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> Entrant for T {}

/// Classification of an entrant relative to a round.
///
/// An entrant is in exactly one of these states at any time. All
/// branching mutators derive it from the same place
/// ([`EliminationRound::state_of`]) rather than re-checking individual
/// indices at each call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrantState<E> {
    /// Waiting to be matched.
    Pending,
    /// Member of this active pairing.
    Paired(Pairing<E>),
    /// Won its pairing.
    Advanced,
    /// Lost or tied its pairing.
    Eliminated,
    /// Removed from the round, with this result preserved.
    Floating(RoundResult),
    /// Not known to the round at all.
    Unknown,
}

/// A single elimination round.
///
/// Tracks which entrants are waiting for an opponent, which are currently
/// matched, and which have advanced or been eliminated. Entrants can join
/// and leave while play is in progress; finished pairings stay on record
/// until nobody involved retains a result, so earlier outcomes can be
/// replayed as long as doing so cannot contradict newer match history.
///
/// There is no stored per-entrant status: every answer is derived from the
/// entrant set, the pending pool, the pairing index and the two result
/// stores, which each mutating operation keeps mutually consistent. All
/// operations run to completion synchronously; failed calls mutate
/// nothing. Mutations touch several of these structures at once, so when
/// sharing a round across threads put the whole value behind one mutex.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "E: Serialize + Clone + Eq + Hash",
    deserialize = "E: Deserialize<'de> + Clone + Eq + Hash"
))]
pub struct EliminationRound<E> {
    entrants: HashSet<E>,
    pending: ShuffledSet<E>,
    /// Results of entrants currently in the round.
    results: ResultIndex<E>,
    /// Results of entrants removed from the round, kept so their finished
    /// pairings stay meaningful.
    floating: ResultIndex<E>,
    pairings: PairingIndex<E>,
}

impl<E: Entrant> Default for EliminationRound<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entrant> FromIterator<E> for EliminationRound<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut round = Self::new();
        for entrant in iter {
            round.add_entrant(entrant);
        }
        round
    }
}

impl<E: Entrant> EliminationRound<E> {
    pub fn new() -> Self {
        Self {
            entrants: HashSet::new(),
            pending: ShuffledSet::new(),
            results: ResultIndex::new(),
            floating: ResultIndex::new(),
            pairings: PairingIndex::new(),
        }
    }

    /// Classify an entrant into its single authoritative state.
    pub fn state_of(&self, entrant: &E) -> EntrantState<E> {
        if self.pending.contains(entrant) {
            EntrantState::Pending
        } else if let Some(pairing) = self.pairings.find_active_by_entrant(entrant) {
            EntrantState::Paired(pairing.clone())
        } else if self.results.is_advanced(entrant) {
            EntrantState::Advanced
        } else if self.results.is_eliminated(entrant) {
            EntrantState::Eliminated
        } else if let Some(result) = self.floating.result_of(entrant) {
            EntrantState::Floating(result)
        } else {
            EntrantState::Unknown
        }
    }

    /// Register an entrant.
    ///
    /// A new entrant starts out pending. An entrant that was removed while
    /// holding a result re-enters with that result restored instead of
    /// becoming pending. Returns `false` if it is already registered.
    pub fn add_entrant(&mut self, entrant: E) -> bool {
        if self.entrants.contains(&entrant) {
            return false;
        }

        if self.floating.contains(&entrant) {
            // Coming back after removal: restore the preserved result.
            let moved = self.floating.move_to(&mut self.results, &entrant);
            debug_assert!(moved);
        } else {
            self.pending.add(entrant.clone());
        }

        debug!(?entrant, "entrant added");
        self.entrants.insert(entrant);
        self.debug_check_invariants();
        true
    }

    /// Remove an entrant from the round.
    ///
    /// A paired entrant's active pairing is discarded and its opponent
    /// returns to pending; removal without a result forgets the match. An
    /// advanced or eliminated entrant keeps its result in the floating
    /// store so finished pairings involving it stay on record. Returns
    /// `false` if there was nothing to remove.
    pub fn remove_entrant(&mut self, entrant: &E) -> bool {
        match self.state_of(entrant) {
            EntrantState::Pending => {
                self.pending.remove(entrant);
            }
            EntrantState::Paired(pairing) => {
                let opponent = Self::opponent_in(&pairing, entrant).clone();
                self.pending.add(opponent);
                self.pairings.remove_active(&pairing);
            }
            EntrantState::Advanced | EntrantState::Eliminated => {
                let moved = self.results.move_to(&mut self.floating, entrant);
                debug_assert!(moved);
            }
            // Already removed earlier; nothing left to drop.
            EntrantState::Floating(_) => return false,
            EntrantState::Unknown => {}
        }

        let removed = self.entrants.remove(entrant);
        if removed {
            debug!(?entrant, "entrant removed");
        }
        self.debug_check_invariants();
        removed
    }

    /// Return an entrant to the pending state, forgetting its progress.
    ///
    /// Resetting a paired entrant dissolves the active pairing and both
    /// members become pending again. Resetting a removed entrant clears
    /// its floating result without re-adding it to the round. Afterwards,
    /// every finished pairing of this entrant whose other member also
    /// retains no result is pruned for good. Returns `false` if the round
    /// holds no state about the entrant or it is already pending.
    pub fn reset_entrant(&mut self, entrant: &E) -> bool {
        match self.state_of(entrant) {
            EntrantState::Pending | EntrantState::Unknown => return false,
            EntrantState::Paired(pairing) => {
                self.pairings.remove_active(&pairing);
                let opponent = Self::opponent_in(&pairing, entrant).clone();
                self.pending.add(opponent);
                self.pending.add(entrant.clone());
            }
            EntrantState::Advanced | EntrantState::Eliminated => {
                self.results.reset(entrant);
                self.pending.add(entrant.clone());
            }
            EntrantState::Floating(_) => {
                debug_assert!(!self.entrants.contains(entrant));
                self.floating.reset(entrant);
            }
        }

        self.prune_finished_pairings(entrant);
        debug!(?entrant, "entrant reset");
        self.debug_check_invariants();
        true
    }

    /// Drop finished pairings of `entrant` whose other member holds no
    /// result anywhere either. Once both sides have been reset or fully
    /// forgotten there is nothing left the pairing could be replayed
    /// against, so its history goes too.
    fn prune_finished_pairings(&mut self, entrant: &E) {
        let stale: Vec<Pairing<E>> = self
            .pairings
            .find_finished_by_entrant(entrant)
            .iter()
            .filter(|pairing| {
                let other = Self::opponent_in(pairing, entrant);
                !self.results.contains(other) && !self.floating.contains(other)
            })
            .cloned()
            .collect();

        for pairing in &stale {
            trace!(?pairing, "finished pairing pruned");
            self.pairings.remove_finished(pairing);
        }
    }

    /// Match two pending entrants chosen uniformly at random.
    pub fn next_pairing(&mut self) -> Result<Pairing<E>, RoundError> {
        self.next_pairing_with(&mut rand::thread_rng())
    }

    /// Like [`next_pairing`](Self::next_pairing), with a caller-supplied
    /// source of randomness.
    pub fn next_pairing_with<R: Rng>(&mut self, rng: &mut R) -> Result<Pairing<E>, RoundError> {
        if self.pending.is_empty() {
            return Err(RoundError::NoEntrants);
        }
        if self.pending.len() == 1 {
            return Err(RoundError::NoOpponent);
        }

        let (first, second) = match (
            self.pending.remove_random(rng),
            self.pending.remove_random(rng),
        ) {
            (Some(first), Some(second)) => (first, second),
            _ => unreachable!("pending pool held at least two entrants"),
        };

        Ok(self.register_pairing(first, second))
    }

    /// Declare `winner` the winner of its active pairing.
    ///
    /// Returns the resolved pairing.
    pub fn declare_winner(&mut self, winner: &E) -> Result<Pairing<E>, RoundError> {
        if !self.entrants.contains(winner) {
            return Err(RoundError::NoSuchEntrant);
        }

        let pairing = self
            .pairings
            .find_active_by_entrant(winner)
            .cloned()
            .ok_or(RoundError::MissingPairing)?;

        self.declare_winner_in(winner, &pairing)?;
        Ok(pairing)
    }

    /// Declare `winner` the winner of a specific active pairing.
    ///
    /// The winner advances and its opponent is eliminated; the pairing
    /// moves to the tail of the finished list, so finished pairings are
    /// ordered by resolution regardless of how many were active at once.
    pub fn declare_winner_in(
        &mut self,
        winner: &E,
        pairing: &Pairing<E>,
    ) -> Result<(), RoundError> {
        if !pairing.contains(winner) {
            return Err(RoundError::WinnerNotInPairing);
        }
        if !self.entrants.contains(winner) {
            return Err(RoundError::NoSuchEntrant);
        }
        if !self.pairings.is_active(pairing) {
            return Err(RoundError::NoSuchPairing);
        }

        let loser = Self::opponent_in(pairing, winner).clone();
        debug!(?winner, ?loser, "winner declared");
        self.results.advance(winner.clone());
        self.results.eliminate(loser);
        self.finish_pairing(pairing);

        Ok(())
    }

    /// Declare an active pairing a tie. Both members are eliminated and
    /// the pairing finishes exactly as it would for a win.
    pub fn declare_tie(&mut self, pairing: &Pairing<E>) -> Result<(), RoundError> {
        if !self.pairings.is_active(pairing) {
            return Err(RoundError::NoSuchPairing);
        }

        debug!(?pairing, "tie declared");
        self.results.eliminate(pairing.first().clone());
        self.results.eliminate(pairing.second().clone());
        self.finish_pairing(pairing);

        Ok(())
    }

    /// Reactivate a finished pairing so it can be played again.
    ///
    /// Both members lose their results and the pairing leaves the
    /// finished list, re-entering play as if freshly matched. Returns
    /// `Ok(false)` without touching anything if the pairing is already
    /// active.
    pub fn replay_pairing(&mut self, pairing: &Pairing<E>) -> Result<bool, RoundError> {
        if self.pairings.is_active(pairing) {
            return Ok(false);
        }
        if !self.pairings.is_finished(pairing) {
            return Err(RoundError::NoSuchPairing);
        }

        // Finished pairings outlive their members: one side keeping a
        // result is enough for the record to survive a removal.
        if !self.entrants.contains(pairing.first()) || !self.entrants.contains(pairing.second()) {
            return Err(RoundError::MissingEntrant);
        }

        if self.is_pairing_orphaned(pairing)? {
            return Err(RoundError::OrphanedPairing);
        }

        self.results.reset(pairing.first());
        self.results.reset(pairing.second());
        self.pairings.remove_finished(pairing);

        // A member may have been reset to pending in the meantime.
        self.pending.remove(pairing.first());
        self.pending.remove(pairing.second());

        debug!(?pairing, "pairing replayed");
        self.register_pairing(pairing.first().clone(), pairing.second().clone());

        Ok(true)
    }

    /// Whether a finished pairing has been overtaken by newer match
    /// history of one of its members.
    ///
    /// An active pairing is never orphaned. A finished pairing whose
    /// members are both out of active play stays authoritative: it is the
    /// last word on those entrants. Once at least one member is in a
    /// newer active pairing, the finished pairing is orphaned unless it
    /// is still the newest pairing of both members.
    pub fn is_pairing_orphaned(&self, pairing: &Pairing<E>) -> Result<bool, RoundError> {
        if self.pairings.is_active(pairing) {
            return Ok(false);
        }
        if !self.pairings.is_finished(pairing) {
            return Err(RoundError::NoSuchPairing);
        }

        let last_of_first = self.pairings.last_pairing_of(pairing.first());
        let last_of_second = self.pairings.last_pairing_of(pairing.second());

        let first_in_play = last_of_first.map_or(false, |last| self.pairings.is_active(last));
        let second_in_play = last_of_second.map_or(false, |last| self.pairings.is_active(last));
        if !first_in_play && !second_in_play {
            return Ok(false);
        }

        Ok(last_of_first != Some(pairing) || last_of_second != Some(pairing))
    }

    pub fn has_entrant(&self, entrant: &E) -> bool {
        self.entrants.contains(entrant)
    }

    /// Whether the round knows anything about this entrant, including a
    /// floating result kept after removal.
    pub fn has_state_about(&self, entrant: &E) -> bool {
        self.entrants.contains(entrant) || self.floating.contains(entrant)
    }

    /// Whether the entrant holds an in-round result. Floating results do
    /// not count here; [`has_won`](Self::has_won) and
    /// [`has_lost`](Self::has_lost) consult them too.
    pub fn has_result(&self, entrant: &E) -> bool {
        self.results.contains(entrant)
    }

    /// Whether the entrant won, in the round or on floating record.
    pub fn has_won(&self, entrant: &E) -> bool {
        self.results.is_advanced(entrant) || self.floating.is_advanced(entrant)
    }

    /// Whether the entrant lost or tied, in the round or on floating
    /// record.
    pub fn has_lost(&self, entrant: &E) -> bool {
        self.results.is_eliminated(entrant) || self.floating.is_eliminated(entrant)
    }

    pub fn is_pending(&self, entrant: &E) -> bool {
        self.pending.contains(entrant)
    }

    pub fn is_paired(&self, entrant: &E) -> bool {
        self.pairings.has_active_entrant(entrant)
    }

    pub fn is_advanced(&self, entrant: &E) -> bool {
        self.results.is_advanced(entrant)
    }

    pub fn is_eliminated(&self, entrant: &E) -> bool {
        self.results.is_eliminated(entrant)
    }

    /// Whether every entrant has a result: nothing pending and nothing
    /// still being played.
    pub fn is_finished(&self) -> bool {
        let finished = self.pending.is_empty() && !self.pairings.has_active();
        debug_assert!(!finished || self.entrants.len() == self.results.len());
        finished
    }

    pub fn entrants(&self) -> &HashSet<E> {
        &self.entrants
    }

    pub fn pending_entrants(&self) -> &[E] {
        self.pending.elements()
    }

    /// Members of active pairings, two per pairing.
    pub fn paired_entrants(&self) -> impl Iterator<Item = &E> + '_ {
        self.pairings.active_entrants()
    }

    pub fn advanced_entrants(&self) -> &HashSet<E> {
        self.results.advanced()
    }

    pub fn eliminated_entrants(&self) -> &HashSet<E> {
        self.results.eliminated()
    }

    pub fn active_pairings(&self) -> &HashSet<Pairing<E>> {
        self.pairings.active()
    }

    /// Finished pairings in the order their outcomes were declared.
    pub fn finished_pairings(&self) -> &[Pairing<E>] {
        self.pairings.finished()
    }

    /// The entrant's newest pairing on record; an active pairing counts
    /// as newer than any finished one.
    pub fn last_pairing_of(&self, entrant: &E) -> Option<&Pairing<E>> {
        self.pairings.last_pairing_of(entrant)
    }

    /// Entrants of the round together with removed entrants that still
    /// hold a floating result.
    pub fn entrants_with_state(&self) -> impl Iterator<Item = &E> + '_ {
        self.entrants
            .iter()
            .chain(self.floating.advanced().iter())
            .chain(self.floating.eliminated().iter())
    }

    /// Create and activate a pairing of two entrants.
    ///
    /// Callers must have taken both entrants out of pending and cleared
    /// any results they held.
    fn register_pairing(&mut self, first: E, second: E) -> Pairing<E> {
        let pairing = Pairing::new(first, second);

        debug_assert!(!self.pairings.contains(&pairing));
        debug_assert!(
            !self.pending.contains(pairing.first()) && !self.pending.contains(pairing.second())
        );
        debug_assert!(
            !self.results.contains(pairing.first()) && !self.results.contains(pairing.second())
        );

        debug!(?pairing, "pairing created");
        self.pairings.add(pairing.clone());
        self.debug_check_invariants();
        pairing
    }

    fn finish_pairing(&mut self, pairing: &Pairing<E>) {
        let finished = self.pairings.finish(pairing);
        debug_assert!(finished);
        self.debug_check_invariants();
    }

    /// The opponent within a pairing obtained by an index lookup keyed on
    /// `entrant`; membership cannot fail.
    fn opponent_in<'p>(pairing: &'p Pairing<E>, entrant: &E) -> &'p E {
        match pairing.other(entrant) {
            Some(other) => other,
            None => unreachable!("pairing {:?} does not contain {:?}", pairing, entrant),
        }
    }

    /// Cross-checks that the indices still agree after a mutation. The
    /// entrant slots of the round split exactly into pending, actively
    /// paired, advanced and eliminated; floating results belong to nobody
    /// currently in the round.
    #[cfg(debug_assertions)]
    fn debug_check_invariants(&self) {
        assert_eq!(
            self.entrants.len(),
            self.pending.len() + self.pairings.active_entrant_count() + self.results.len(),
            "entrant bookkeeping out of balance"
        );
        assert!(self.pairings.partitions_consistent());
        assert!(self
            .floating
            .advanced()
            .iter()
            .chain(self.floating.eliminated().iter())
            .all(|e| !self.entrants.contains(e) && !self.results.contains(e)));
    }

    #[cfg(not(debug_assertions))]
    fn debug_check_invariants(&self) {}
}

#[cfg(test)]
#[path = "elimination_tests.rs"]
mod elimination_tests;
