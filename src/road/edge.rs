use std::fmt::{Debug, Formatter};
use std::sync::{Arc, OnceLock};

use geo::LineString;

use crate::road::{BaseRoad, Direction, Heading};

/// A directed edge of the routable graph.
///
/// Every [`BaseRoad`] yields one edge per permitted heading: a forward edge
/// with id `2 * base.id`, and for two-way roads a backward sibling with
/// id `2 * base.id + 1`. The even/odd convention makes the mapping between
/// edge ids and `(base road, heading)` a stable bijection, and sibling
/// lookup a single bit flip.
pub struct Road {
    base: Arc<BaseRoad>,
    heading: Heading,

    /// Reversed polyline of the backward edge, derived on first access.
    reversed: OnceLock<LineString>,
}

impl Road {
    pub(crate) fn new(base: Arc<BaseRoad>, heading: Heading) -> Road {
        Road {
            base,
            heading,
            reversed: OnceLock::new(),
        }
    }

    /// Directed edge identifier: even forward, odd backward.
    #[inline]
    pub fn id(&self) -> i64 {
        match self.heading {
            Heading::Forward => self.base.id * 2,
            Heading::Backward => self.base.id * 2 + 1,
        }
    }

    /// Recovers the `(base road, heading)` pair behind an edge id.
    #[inline]
    pub fn decompose(id: i64) -> (i64, Heading) {
        if id % 2 == 0 {
            (id / 2, Heading::Forward)
        } else {
            (id / 2, Heading::Backward)
        }
    }

    #[inline]
    pub fn base(&self) -> &Arc<BaseRoad> {
        &self.base
    }

    #[inline]
    pub fn heading(&self) -> Heading {
        self.heading
    }

    /// Source vertex in travel direction.
    #[inline]
    pub fn source(&self) -> i64 {
        match self.heading {
            Heading::Forward => self.base.source,
            Heading::Backward => self.base.target,
        }
    }

    /// Target vertex in travel direction.
    #[inline]
    pub fn target(&self) -> i64 {
        match self.heading {
            Heading::Forward => self.base.target,
            Heading::Backward => self.base.source,
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.base.length
    }

    /// Maximum speed in travel direction, in km/h.
    #[inline]
    pub fn maxspeed(&self) -> f64 {
        self.base.maxspeed(self.heading)
    }

    #[inline]
    pub fn priority(&self) -> f64 {
        self.base.priority
    }

    /// Edge id of the opposite-heading sibling, if the base road is two-way.
    #[inline]
    pub fn sibling(&self) -> Option<i64> {
        matches!(self.base.direction, Direction::Both).then(|| self.id() ^ 1)
    }

    /// Polyline in travel direction.
    ///
    /// The forward edge borrows the base geometry; the backward edge
    /// reverses it once and caches the result.
    pub fn geometry(&self) -> &LineString {
        match self.heading {
            Heading::Forward => self.base.geometry(),
            Heading::Backward => self.reversed.get_or_init(|| {
                let mut line = self.base.geometry().clone();
                line.0.reverse();
                line
            }),
        }
    }
}

impl PartialEq for Road {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Road {}

impl std::hash::Hash for Road {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl Debug for Road {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Road")
            .field("id", &self.id())
            .field("base", &self.base.id)
            .field("heading", &self.heading)
            .finish()
    }
}
