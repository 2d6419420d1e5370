use std::sync::Arc;

use crate::road::{Road, RoadPoint};
use crate::route::cost::{Cost, Distance};
use crate::route::error::PathError;

/// A routed sequence of connected edges between two road points.
///
/// Invariants, enforced at construction:
/// * the first edge carries the source point, the last the target point,
/// * consecutive edges meet at a shared vertex,
/// * a single-edge path never runs backwards along its edge.
#[derive(Clone, Debug)]
pub struct Path {
    source: RoadPoint,
    target: RoadPoint,
    edges: Vec<Arc<Road>>,
}

impl Path {
    /// A path that starts and ends at the same road point.
    pub fn single(point: RoadPoint) -> Path {
        let edge = Arc::clone(point.edge());
        Path {
            source: point.clone(),
            target: point,
            edges: vec![edge],
        }
    }

    /// Builds a validated path. Violations are programmer errors on the
    /// caller's side, surfaced rather than absorbed.
    pub fn new(
        source: RoadPoint,
        target: RoadPoint,
        edges: Vec<Arc<Road>>,
    ) -> Result<Path, PathError> {
        let (Some(first), Some(last)) = (edges.first(), edges.last()) else {
            return Err(PathError::Empty);
        };

        if first.id() != source.edge().id() {
            return Err(PathError::SourceMismatch(first.id()));
        }

        if last.id() != target.edge().id() {
            return Err(PathError::TargetMismatch(last.id()));
        }

        if edges.len() == 1 && source.fraction() > target.fraction() {
            return Err(PathError::BackwardOnEdge);
        }

        for pair in edges.windows(2) {
            if let [a, b] = pair {
                if a.target() != b.source() {
                    return Err(PathError::Disconnected(a.id(), b.id()));
                }
            }
        }

        Ok(Path {
            source,
            target,
            edges,
        })
    }

    #[inline]
    pub fn source(&self) -> &RoadPoint {
        &self.source
    }

    #[inline]
    pub fn target(&self) -> &RoadPoint {
        &self.target
    }

    #[inline]
    pub fn edges(&self) -> &[Arc<Road>] {
        &self.edges
    }

    /// Number of edges along the path.
    #[inline]
    pub fn size(&self) -> usize {
        self.edges.len()
    }

    /// Cost of the path under an arbitrary cost function, pricing the first
    /// and last edges by their traversed fractions only.
    pub fn cost(&self, cost: &impl Cost) -> f64 {
        let mut value = cost.cost_fraction(self.source.edge(), 1.0 - self.source.fraction());

        for edge in &self.edges[1..] {
            value += cost.cost(edge);
        }

        value - cost.cost_fraction(self.target.edge(), 1.0 - self.target.fraction())
    }

    /// Geometric length of the path, in meters.
    #[inline]
    pub fn length(&self) -> f64 {
        self.cost(&Distance)
    }

    /// Whether the path reverses onto an opposite-heading sibling edge at
    /// any point.
    pub fn is_uturn(&self) -> bool {
        self.edges.windows(2).any(|pair| {
            if let [a, b] = pair {
                a.base().id == b.base().id && a.id() != b.id()
            } else {
                false
            }
        })
    }

    /// Whether any edge of the path runs through a tunnel.
    pub fn has_tunnel(&self) -> bool {
        self.edges.iter().any(|edge| edge.base().tunnel)
    }

    /// Summed length of the tunnel edges along the path, in meters.
    pub fn tunnel_length(&self) -> f64 {
        self.edges
            .iter()
            .filter(|edge| edge.base().tunnel)
            .map(|edge| edge.length())
            .sum()
    }

    /// Appends `other` to this path.
    ///
    /// The paths must share their endpoint: either the same road point on
    /// the same edge, or this path ends at fraction 1 on an edge whose
    /// target vertex starts `other`'s first edge at fraction 0.
    pub fn join(&mut self, other: &Path) -> Result<(), PathError> {
        let same_edge = self.target.edge().id() == other.source.edge().id();

        if same_edge {
            if self.target.fraction() != other.source.fraction() {
                return Err(PathError::JoinMismatch);
            }

            self.edges.extend(other.edges[1..].iter().cloned());
        } else {
            if self.target.edge().target() != other.source.edge().source()
                || self.target.fraction() != 1.0
                || other.source.fraction() != 0.0
            {
                return Err(PathError::JoinMismatch);
            }

            self.edges.extend(other.edges.iter().cloned());
        }

        self.target = other.target.clone();
        Ok(())
    }
}
