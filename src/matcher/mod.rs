//! Map matching of position samples onto the road network.
//!
//! Binds the generic [`markov`](crate::markov) filter to road-bound state:
//! [`MatcherSample`] measurements emit [`MatcherCandidate`] road positions,
//! [`MatcherTransition`]s carry routed paths between consecutive
//! candidates, and the [`Matcher`] façade drives the whole thing online,
//! one sample at a time.

pub mod candidate;
pub mod error;
pub mod filter;
pub mod json;
pub mod online;
pub mod sample;


#[doc(inline)]
pub use candidate::{MatcherCandidate, MatcherTransition};
#[doc(inline)]
pub use error::{JsonError, MatcherError};
#[doc(inline)]
pub use filter::{MatcherConfig, MatcherFilter};
#[doc(inline)]
pub use online::{Matcher, Update};
#[doc(inline)]
pub use sample::MatcherSample;
