//! Error types for round operations

use thiserror::Error;

/// Failures a round operation can report.
///
/// Every condition is detected before any state is mutated, so a returned
/// error never leaves the round partially updated. Operations with an
/// obvious "nothing to do" outcome (adding a known entrant, resetting an
/// untouched one) return `false` instead of an error; these variants cover
/// logically invalid requests only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RoundError {
    /// A pairing was requested with no pending entrants.
    #[error("no pending entrants to pair")]
    NoEntrants,

    /// A pairing was requested with a single pending entrant.
    #[error("a single pending entrant has no opponent")]
    NoOpponent,

    /// The referenced entrant is not registered in the round.
    #[error("entrant is not part of the round")]
    NoSuchEntrant,

    /// The referenced pairing is neither active nor finished.
    #[error("pairing is unknown to the round")]
    NoSuchPairing,

    /// The entrant has no active pairing although one was expected.
    #[error("entrant has no active pairing")]
    MissingPairing,

    /// A replayed pairing references an entrant that has left the round.
    #[error("pairing references an entrant that is no longer in the round")]
    MissingEntrant,

    /// The finished pairing is stale relative to newer match history of
    /// one of its members and cannot be replayed.
    #[error("pairing is orphaned by a newer pairing of one of its members")]
    OrphanedPairing,

    /// The declared winner is not a member of the supplied pairing.
    #[error("winner is not a member of the pairing")]
    WinnerNotInPairing,
}
