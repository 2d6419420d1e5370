use std::sync::Arc;

use geo::Point;

use crate::road::Road;
use crate::spatial;

/// A position on a directed edge, measured as the cumulative geodesic
/// length fraction from the edge's source vertex.
#[derive(Clone)]
pub struct RoadPoint {
    road: Arc<Road>,
    fraction: f64,
    position: Point,
}

impl RoadPoint {
    /// Pins a fraction onto an edge. The fraction clamps into `[0, 1]`; the
    /// geographic position is interpolated once at construction.
    pub fn new(road: Arc<Road>, fraction: f64) -> RoadPoint {
        let fraction = fraction.clamp(0.0, 1.0);
        let position = spatial::interpolate(road.geometry(), fraction);

        RoadPoint {
            road,
            fraction,
            position,
        }
    }

    /// Pins an already-projected position onto an edge without
    /// re-interpolating it.
    pub(crate) fn projected(road: Arc<Road>, fraction: f64, position: Point) -> RoadPoint {
        RoadPoint {
            road,
            fraction: fraction.clamp(0.0, 1.0),
            position,
        }
    }

    #[inline]
    pub fn edge(&self) -> &Arc<Road> {
        &self.road
    }

    #[inline]
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Azimuth of the edge tangent at this point, in degrees `[0, 360)`.
    pub fn azimuth(&self) -> f64 {
        spatial::tangent(self.road.geometry(), self.fraction)
    }
}

impl PartialEq for RoadPoint {
    fn eq(&self, other: &Self) -> bool {
        self.road.id() == other.road.id() && self.fraction == other.fraction
    }
}

impl std::fmt::Debug for RoadPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoadPoint")
            .field("edge", &self.road.id())
            .field("fraction", &self.fraction)
            .finish()
    }
}
