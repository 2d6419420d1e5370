//! Online Hidden-Markov-Model (HMM) map matching.
//!
//! Matches a stream of noisy position fixes onto a directed road network,
//! inferring for every sample the most probable on-road positions together
//! with the routes taken between them.
//!
//! The crate is organised leaves-first:
//!
//! * [`spatial`]: WGS-84 geodesy primitives.
//! * [`road`]: the directed road graph, split edges and the spatial index.
//! * [`route`]: cost functions, paths and the bounded multi-target router.
//! * [`markov`]: the generic HMM forward filter and sliding state window.
//! * [`matcher`]: the concrete map matcher built on all of the above.

pub mod markov;
pub mod matcher;
pub mod road;
pub mod route;
pub mod spatial;

#[doc(inline)]
pub use matcher::{Matcher, MatcherCandidate, MatcherConfig, MatcherSample, MatcherTransition};
#[doc(inline)]
pub use road::{BaseRoad, Direction, Heading, Road, RoadMap, RoadPoint};
#[doc(inline)]
pub use route::{Cost, Path, Router};
