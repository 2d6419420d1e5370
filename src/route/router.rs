use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use log::trace;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::road::{Road, RoadMap, RoadPoint};
use crate::route::cost::{Cost, MaxVelocityTime, Time};
use crate::route::path::Path;

/// Bounding cost for a routing request: frontier entries whose accumulated
/// bound key exceeds `max` are discarded.
pub struct Bounds<'a> {
    pub cost: &'a dyn Cost,
    pub max: f64,
}

/// Queue entry for one edge of the search frontier.
///
/// Ordered as a min-heap on `(key, edge id, parent id)`: ascending edge id
/// breaks cost ties, ascending parent id breaks ties between equal-cost
/// entries for the same edge. Pop order, parent selection and router output
/// are therefore fully deterministic.
struct Frontier {
    key: f64,
    bound: f64,
    edge: i64,
    parent: i64,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.edge.cmp(&self.edge))
            .then_with(|| other.parent.cmp(&self.parent))
    }
}

/// Sentinel parent for the search origin.
const ORIGIN: i64 = i64::MIN;

/// Goal-directed, bounded, multi-target Dijkstra over the edge graph.
///
/// One search settles least-cost paths from a single source road point to
/// many target road points at once; targets that cannot be reached within
/// the bound map to `None` instead of failing.
pub struct Router {
    map: Arc<RoadMap>,
}

impl Router {
    pub fn new(map: Arc<RoadMap>) -> Router {
        Router { map }
    }

    #[inline]
    pub fn map(&self) -> &Arc<RoadMap> {
        &self.map
    }

    /// Routes from `source` to every target, returning one path per target
    /// in input order, or `None` where no path settles within the bound.
    ///
    /// A target on the source edge at an equal or later fraction settles
    /// immediately as a single-edge path. All other targets settle when
    /// their edge is popped from the frontier; an edge never re-enters the
    /// frontier, so a target behind the source on its own edge is reached
    /// via the opposite-heading sibling (a u-turn) or not at all.
    pub fn route(
        &self,
        source: &RoadPoint,
        targets: &[RoadPoint],
        cost: &dyn Cost,
        bounds: Option<Bounds>,
    ) -> Vec<Option<Path>> {
        let mut routes: Vec<Option<Path>> = vec![None; targets.len()];
        let mut remaining = targets.len();

        let mut targets_by_edge: FxHashMap<i64, SmallVec<[usize; 2]>> = FxHashMap::default();
        for (index, target) in targets.iter().enumerate() {
            if target.edge().id() == source.edge().id()
                && target.fraction() >= source.fraction()
            {
                let edge = Arc::clone(source.edge());
                let path = Path::new(source.clone(), target.clone(), vec![edge])
                    .expect("a same-edge forward path is always valid");
                routes[index] = Some(path);
                remaining -= 1;
                continue;
            }

            targets_by_edge
                .entry(target.edge().id())
                .or_default()
                .push(index);
        }

        if remaining == 0 {
            return routes;
        }

        let mut queue = BinaryHeap::new();
        let mut parents: FxHashMap<i64, i64> = FxHashMap::default();

        let start_bound = bounds
            .as_ref()
            .map(|b| b.cost.cost_fraction(source.edge(), 1.0 - source.fraction()))
            .unwrap_or(0.0);

        if bounds.as_ref().is_none_or(|b| start_bound <= b.max) {
            queue.push(Frontier {
                key: cost.cost_fraction(source.edge(), 1.0 - source.fraction()),
                bound: start_bound,
                edge: source.edge().id(),
                parent: ORIGIN,
            });
        }

        while let Some(entry) = queue.pop() {
            if parents.contains_key(&entry.edge) {
                continue;
            }
            parents.insert(entry.edge, entry.parent);

            if let Some(indices) = targets_by_edge.remove(&entry.edge) {
                for index in indices {
                    // A target behind the source on the source edge itself
                    // is not on this path; it needs a genuine re-entry.
                    if entry.edge == source.edge().id() {
                        continue;
                    }

                    let edges = self.unwind(entry.edge, &parents);
                    let path = Path::new(source.clone(), targets[index].clone(), edges)
                        .expect("settled edge chains are connected");
                    routes[index] = Some(path);
                    remaining -= 1;
                }

                if remaining == 0 {
                    break;
                }
            }

            let Some(road) = self.map.edge(entry.edge) else {
                continue;
            };

            for successor in self.map.successors(road) {
                if parents.contains_key(&successor.id()) {
                    continue;
                }

                let bound = entry.bound
                    + bounds
                        .as_ref()
                        .map(|b| b.cost.cost(successor))
                        .unwrap_or(0.0);

                if bounds.as_ref().is_some_and(|b| bound > b.max) {
                    trace!("pruned edge {} at bound {bound}", successor.id());
                    continue;
                }

                queue.push(Frontier {
                    key: entry.key + cost.cost(successor),
                    bound,
                    edge: successor.id(),
                    parent: entry.edge,
                });
            }
        }

        routes
    }

    /// Routes with a traversal-time bound: entries are pruned once their
    /// accumulated time exceeds `max_time` seconds, with edge speeds raised
    /// to at least `max_velocity` (m/s) when given.
    pub fn route_within_time(
        &self,
        source: &RoadPoint,
        targets: &[RoadPoint],
        cost: &dyn Cost,
        max_time: f64,
        max_velocity: Option<f64>,
    ) -> Vec<Option<Path>> {
        match max_velocity {
            Some(velocity) => {
                let bound = MaxVelocityTime { velocity };
                self.route(source, targets, cost, Some(Bounds { cost: &bound, max: max_time }))
            }
            None => self.route(source, targets, cost, Some(Bounds { cost: &Time, max: max_time })),
        }
    }

    /// Rebuilds the settled edge chain from `edge` back to the origin.
    fn unwind(&self, edge: i64, parents: &FxHashMap<i64, i64>) -> Vec<Arc<Road>> {
        let mut chain = Vec::new();
        let mut current = edge;

        while current != ORIGIN {
            if let Some(road) = self.map.edge(current) {
                chain.push(Arc::clone(road));
            }
            current = *parents.get(&current).unwrap_or(&ORIGIN);
        }

        chain.reverse();
        chain
    }
}
