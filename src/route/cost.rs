use crate::road::Road;

const KMH_IN_MS: f64 = 3.6;

/// An additive, non-negative edge cost.
///
/// `cost_fraction` scales the full-edge cost linearly, which is what lets
/// the router and [`Path::cost`](crate::route::Path::cost) price partial
/// first and last edges.
pub trait Cost: Send + Sync {
    /// Cost of traversing the whole edge.
    fn cost(&self, road: &Road) -> f64;

    /// Cost of traversing the given fraction of the edge.
    #[inline]
    fn cost_fraction(&self, road: &Road, fraction: f64) -> f64 {
        self.cost(road) * fraction
    }
}

/// Geometric length, in meters.
pub struct Distance;

impl Cost for Distance {
    #[inline]
    fn cost(&self, road: &Road) -> f64 {
        road.length()
    }
}

/// Geometric length scaled by the road's priority factor.
pub struct DistancePriority;

impl Cost for DistancePriority {
    #[inline]
    fn cost(&self, road: &Road) -> f64 {
        road.length() * road.priority()
    }
}

/// Traversal time at the edge's maximum speed, in seconds.
pub struct Time;

impl Cost for Time {
    #[inline]
    fn cost(&self, road: &Road) -> f64 {
        road.length() / (road.maxspeed() / KMH_IN_MS)
    }
}

/// Traversal time scaled by the road's priority factor.
pub struct TimePriority;

impl Cost for TimePriority {
    #[inline]
    fn cost(&self, road: &Road) -> f64 {
        road.length() / (road.maxspeed() / KMH_IN_MS) * road.priority()
    }
}

/// Traversal time with the edge speed raised to at least `velocity` meters
/// per second.
///
/// Used as a bounding cost: pruning on this time admits every path a
/// vehicle moving up to `velocity` could have taken, even across slow
/// edges.
pub struct MaxVelocityTime {
    pub velocity: f64,
}

impl Cost for MaxVelocityTime {
    #[inline]
    fn cost(&self, road: &Road) -> f64 {
        road.length() / (road.maxspeed() / KMH_IN_MS).max(self.velocity)
    }
}
