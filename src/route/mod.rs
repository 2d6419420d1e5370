//! Routing over the directed road graph.
//!
//! Provides additive [`Cost`] functions, validated edge [`Path`]s and the
//! bounded multi-target Dijkstra [`Router`] that the HMM transition model
//! is built on.

pub mod cost;
pub mod error;
pub mod path;
pub mod router;


#[doc(inline)]
pub use cost::{Cost, Distance, DistancePriority, MaxVelocityTime, Time, TimePriority};
#[doc(inline)]
pub use error::PathError;
#[doc(inline)]
pub use path::Path;
#[doc(inline)]
pub use router::{Bounds, Router};
