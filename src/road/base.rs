use geo::LineString;

use crate::road::RoadError;
use crate::spatial;

/// Travel direction of a directed edge relative to its base road geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Heading {
    Forward,
    Backward,
}

/// Traffic restriction of a base road.
///
/// `Forward` and `Backward` roads are one-way; `Both` roads are projected
/// into a pair of sibling edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Forward = 1,
    Backward = 2,
    Both = 3,
}

impl Direction {
    /// Decodes the provider's numeric direction encoding.
    pub fn from_value(value: u8) -> Option<Direction> {
        match value {
            1 => Some(Direction::Forward),
            2 => Some(Direction::Backward),
            3 => Some(Direction::Both),
            _ => None,
        }
    }

    #[inline]
    pub fn oneway(&self) -> bool {
        !matches!(self, Direction::Both)
    }
}

/// An undirected road segment as delivered by a road provider.
///
/// Base roads are immutable once constructed; the routable graph projects
/// them into directed [`Road`](crate::road::Road) edges. The geometry is the
/// canonical forward polyline (source to target); backward edges derive the
/// reversed polyline lazily.
#[derive(Clone, Debug)]
pub struct BaseRoad {
    pub id: i64,
    /// Identifier of the source-data road this segment was split from.
    /// One source road commonly splits into many segments, so this is a
    /// many-to-one reference.
    pub refid: i64,
    pub source: i64,
    pub target: i64,
    pub direction: Direction,
    /// Road-class identifier, opaque to the matcher.
    pub kind: i16,
    /// Multiplicative routing cost factor, `>= 1.0`.
    pub priority: f64,
    /// Maximum speed from source to target, in km/h.
    pub maxspeed_forward: f64,
    /// Maximum speed from target to source, in km/h.
    pub maxspeed_backward: f64,
    /// Geodesic length of the geometry, in meters.
    pub length: f64,
    pub tunnel: bool,
    /// Whether this segment is the last one before a tunnel.
    pub tunnel_entry: bool,
    pub country: Option<String>,

    geometry: LineString,
}

impl BaseRoad {
    /// Constructs a validated base road. The length is derived from the
    /// geometry, so a well-formed polyline guarantees `length > 0`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        refid: i64,
        source: i64,
        target: i64,
        direction: Direction,
        kind: i16,
        priority: f64,
        maxspeed_forward: f64,
        maxspeed_backward: f64,
        geometry: LineString,
    ) -> Result<BaseRoad, RoadError> {
        if geometry.0.len() < 2 {
            return Err(RoadError::TruncatedGeometry(id));
        }

        let length = spatial::length(&geometry);
        if !(length > 0.0) {
            return Err(RoadError::DegenerateGeometry(id));
        }

        if !(maxspeed_forward > 0.0) || !(maxspeed_backward > 0.0) {
            return Err(RoadError::InvalidMaxspeed(id));
        }

        if !(priority >= 1.0) {
            return Err(RoadError::InvalidPriority(id));
        }

        Ok(BaseRoad {
            id,
            refid,
            source,
            target,
            direction,
            kind,
            priority,
            maxspeed_forward,
            maxspeed_backward,
            length,
            tunnel: false,
            tunnel_entry: false,
            country: None,
            geometry,
        })
    }

    pub fn with_tunnel(mut self, tunnel: bool, tunnel_entry: bool) -> BaseRoad {
        self.tunnel = tunnel;
        self.tunnel_entry = tunnel_entry;
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> BaseRoad {
        self.country = Some(country.into());
        self
    }

    /// Maximum speed for the given heading, in km/h.
    #[inline]
    pub fn maxspeed(&self, heading: Heading) -> f64 {
        match heading {
            Heading::Forward => self.maxspeed_forward,
            Heading::Backward => self.maxspeed_backward,
        }
    }

    /// The canonical forward polyline, from source to target.
    #[inline]
    pub fn geometry(&self) -> &LineString {
        &self.geometry
    }
}
