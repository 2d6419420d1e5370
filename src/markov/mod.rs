//! Generic Hidden-Markov-Model machinery.
//!
//! The [`Filter`] runs one online forward (Viterbi) step per measurement
//! over any state type exposing the [`StateCandidate`] capabilities; the
//! concrete map matcher plugs in road-bound candidates, while tests can use
//! synthetic ones. [`KState`] keeps the bounded window of past state
//! vectors alive for trajectory extraction.

pub mod filter;
pub mod kstate;

mod test;

#[doc(inline)]
pub use filter::{Filter, Sample, StateCandidate, StateTransition};
#[doc(inline)]
pub use kstate::KState;
