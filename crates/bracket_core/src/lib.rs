//! Single-elimination round tracking
//!
//! This crate provides the bookkeeping core for one knockout round:
//! - registering and removing entrants while play is in progress
//! - matching pending entrants into uniformly random pairings
//! - declaring winners and ties, advancing and eliminating entrants
//! - replaying finished pairings when an outcome has to be corrected
//!
//! Entrant identifiers are caller-supplied opaque values; anything
//! `Clone + Eq + Hash + Debug` works. The round never inspects them.
//!
//! # Usage
//!
//! ```
//! use bracket_core::EliminationRound;
//!
//! let mut round: EliminationRound<&str> = EliminationRound::new();
//! round.add_entrant("ada");
//! round.add_entrant("grace");
//!
//! let pairing = round.next_pairing()?;
//! round.declare_winner(pairing.first())?;
//! assert!(round.is_finished());
//! # Ok::<(), bracket_core::RoundError>(())
//! ```

mod elimination;
mod error;
mod pairing;
mod pairing_index;
mod result_index;
mod shuffled_set;

pub use elimination::*;
pub use error::*;
pub use pairing::*;
pub use pairing_index::*;
pub use result_index::*;
pub use shuffled_set::*;
