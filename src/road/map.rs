use std::sync::Arc;

use geo::{BoundingRect, Point};
use itertools::Itertools;
use log::{debug, info};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use rstar::{RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::road::{BaseRoad, Direction, Heading, Road, RoadError, RoadPoint};
use crate::spatial;

/// Bounding envelope of one directed edge, as stored in the R-tree.
///
/// Both siblings of a two-way road carry their own entry so that a radius
/// query yields one projection per directed edge.
struct EdgeEnvelope {
    id: i64,
    envelope: AABB<Point>,
}

impl RTreeObject for EdgeEnvelope {
    type Envelope = AABB<Point>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope.clone()
    }
}

/// The routable road map: a directed graph of split edges together with a
/// spatial index over their geometries.
///
/// Built once from a road provider's [`BaseRoad`] records and immutable
/// thereafter, which makes it safe to share across concurrently matched
/// traces.
pub struct RoadMap {
    edges: FxHashMap<i64, Arc<Road>>,

    /// Outgoing edge ids per source vertex, ascending by edge id so that
    /// successor iteration is deterministic.
    adjacency: FxHashMap<i64, SmallVec<[i64; 4]>>,

    index: RTree<EdgeEnvelope>,
}

impl RoadMap {
    /// Builds the graph in one pass over the provider's records.
    ///
    /// Two-way roads emit a forward/backward sibling pair; one-way roads a
    /// single edge of the permitted heading. Duplicate base identifiers are
    /// fatal.
    pub fn build(roads: impl IntoIterator<Item = BaseRoad>) -> Result<RoadMap, RoadError> {
        let roads = roads.into_iter().collect::<Vec<_>>();

        let projected = roads
            .into_par_iter()
            .map(|base| {
                let base = Arc::new(base);
                let headings: &[Heading] = match base.direction {
                    Direction::Forward => &[Heading::Forward],
                    Direction::Backward => &[Heading::Backward],
                    Direction::Both => &[Heading::Forward, Heading::Backward],
                };

                // The envelope covers the full polyline; it is identical
                // for both headings.
                let rect = base
                    .geometry()
                    .bounding_rect()
                    .map(|rect| AABB::from_corners(rect.min().into(), rect.max().into()));

                headings
                    .iter()
                    .map(|heading| {
                        let road = Arc::new(Road::new(Arc::clone(&base), *heading));
                        let envelope = rect.clone().map(|envelope| EdgeEnvelope {
                            id: road.id(),
                            envelope,
                        });
                        (road, envelope)
                    })
                    .collect::<Vec<_>>()
            })
            .flatten()
            .collect::<Vec<_>>();

        let mut edges = FxHashMap::default();
        let mut adjacency: FxHashMap<i64, SmallVec<[i64; 4]>> = FxHashMap::default();
        let mut envelopes = Vec::with_capacity(projected.len());

        for (road, envelope) in projected {
            adjacency.entry(road.source()).or_default().push(road.id());
            if let Some(envelope) = envelope {
                envelopes.push(envelope);
            }

            if edges.insert(road.id(), Arc::clone(&road)).is_some() {
                return Err(RoadError::DuplicateRoad(road.base().id));
            }
        }

        for outgoing in adjacency.values_mut() {
            outgoing.sort_unstable();
        }

        let index = RTree::bulk_load(envelopes);
        info!("road map built: {} edges, {} vertices", edges.len(), adjacency.len());

        Ok(RoadMap { edges, adjacency, index })
    }

    /// Number of directed edges.
    pub fn size(&self) -> usize {
        self.edges.len()
    }

    pub fn edge(&self, id: i64) -> Option<&Arc<Road>> {
        self.edges.get(&id)
    }

    /// The opposite-heading sibling of a two-way edge.
    pub fn sibling(&self, road: &Road) -> Option<&Arc<Road>> {
        road.sibling().and_then(|id| self.edges.get(&id))
    }

    /// Outgoing edges of `road`'s target vertex, ascending by edge id.
    ///
    /// Every successor's source vertex equals `road.target()`; heading
    /// restrictions were already applied when one-way base roads were
    /// projected into single edges.
    pub fn successors<'a>(&'a self, road: &Road) -> impl Iterator<Item = &'a Arc<Road>> + 'a {
        self.outgoing(road.target())
    }

    /// Outgoing edges of a vertex, ascending by edge id.
    pub fn outgoing<'a>(&'a self, vertex: i64) -> impl Iterator<Item = &'a Arc<Road>> + 'a {
        self.adjacency
            .get(&vertex)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id))
    }

    /// All road points within `radius` meters of `q`.
    ///
    /// Performs a coarse envelope query first, then projects `q` exactly
    /// onto each candidate edge. Each directed edge contributes at most one
    /// projection, so both siblings of a two-way road appear (same
    /// geometric point, opposite edges). Results are ascending by edge id.
    pub fn radius(&self, q: Point, radius: f64) -> Vec<RoadPoint> {
        // Corner offset of r·√2 gives the query box a half-width of the
        // full radius.
        let diagonal = radius * std::f64::consts::SQRT_2;
        let envelope = AABB::from_corners(
            spatial::destination(q, 225.0, diagonal),
            spatial::destination(q, 45.0, diagonal),
        );

        let points = self
            .index
            .locate_in_envelope_intersecting(&envelope)
            .filter_map(|entry| self.edges.get(&entry.id))
            .filter_map(|road| {
                let (position, fraction) = spatial::project(road.geometry(), q);
                (spatial::distance(q, position) <= radius)
                    .then(|| RoadPoint::projected(Arc::clone(road), fraction, position))
            })
            .sorted_by_key(|point| point.edge().id())
            .collect::<Vec<_>>();

        debug!("radius search at {q:?} r={radius}: {} road points", points.len());
        points
    }
}
