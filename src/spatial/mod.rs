//! WGS-84 geodesy primitives.
//!
//! Every distance, heading and projection in the crate funnels through this
//! module so that all callers agree on one geodesic model. All functions are
//! pure and deterministic; results are finite unless the inputs themselves
//! are degenerate (empty polylines, zero-length segments), in which case
//! `NaN` is returned rather than panicking.


use geo::{Bearing, Destination, Distance, Geodesic, InterpolatePoint, LineString, Point};

/// Normalizes an azimuth, in degrees, into `[0, 360)`.
///
/// The result is periodic: `normalize_azimuth(a + 360.0 * k)` equals
/// `normalize_azimuth(a)` for any integer `k`. Non-finite inputs pass
/// through unchanged.
#[inline]
pub fn normalize_azimuth(azimuth: f64) -> f64 {
    if !azimuth.is_finite() {
        return azimuth;
    }

    let normalized = azimuth.rem_euclid(360.0);
    // rem_euclid(x, 360) may round up to exactly 360 for tiny negative x.
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Geodesic (inverse problem) distance between two positions, in meters.
#[inline]
pub fn distance(a: Point, b: Point) -> f64 {
    Geodesic.distance(a, b)
}

/// Initial geodesic bearing from `a` to `b`, in degrees within `[0, 360)`.
#[inline]
pub fn azimuth(a: Point, b: Point) -> f64 {
    normalize_azimuth(Geodesic.bearing(a, b))
}

/// Moves `distance` meters from `origin` along `bearing` degrees.
#[inline]
pub fn destination(origin: Point, bearing: f64, distance: f64) -> Point {
    Geodesic.destination(origin, bearing, distance)
}

/// Length of a polyline as the sum of its geodesic segments, in meters.
pub fn length(line: &LineString) -> f64 {
    line.points()
        .zip(line.points().skip(1))
        .fold(0.0, |sum, (a, b)| sum + distance(a, b))
}

/// Interpolates the point at cumulative-length fraction `f ∈ [0, 1]` along
/// `line`, measured from the first vertex.
///
/// Fractions outside `[0, 1]` clamp to the endpoints. A polyline without
/// vertices yields a `NaN` point.
pub fn interpolate(line: &LineString, fraction: f64) -> Point {
    let Some(first) = line.points().next() else {
        return Point::new(f64::NAN, f64::NAN);
    };

    let total = length(line);
    if !(fraction > 0.0) || total <= 0.0 {
        return first;
    }

    let mut remaining = fraction.min(1.0) * total;
    let mut last = first;

    for (a, b) in line.points().zip(line.points().skip(1)) {
        let segment = distance(a, b);
        if segment > 0.0 && remaining <= segment {
            return Geodesic.point_at_ratio_between(a, b, remaining / segment);
        }

        remaining -= segment;
        last = b;
    }

    last
}

/// Fraction of the segment `[a, b]` closest to `q`, unclamped.
///
/// Computed in a local equirectangular plane around the segment, which is
/// exact in the limit of short segments (road geometry). Values below `0`
/// or above `1` indicate the perpendicular foot lies beyond an endpoint.
/// A zero-length segment is degenerate and yields `NaN`.
pub fn intercept(a: Point, b: Point, q: Point) -> f64 {
    // Longitudes shrink with latitude; flatten around the segment's mean.
    let scale = ((a.y() + b.y()) / 2.0).to_radians().cos();

    let (dx, dy) = ((b.x() - a.x()) * scale, b.y() - a.y());
    let (qx, qy) = ((q.x() - a.x()) * scale, q.y() - a.y());

    let norm = dx * dx + dy * dy;
    if norm <= 0.0 {
        return f64::NAN;
    }

    (qx * dx + qy * dy) / norm
}

/// Projects `q` onto `line`, returning the closest on-line point and its
/// cumulative-length fraction within `[0, 1]`.
///
/// Each segment is examined exactly: the perpendicular intercept is clamped
/// into the segment, the geodesic distance to the clamped point is measured,
/// and the nearest wins. Ties keep the earliest segment, which keeps the
/// result deterministic for self-overlapping polylines.
pub fn project(line: &LineString, q: Point) -> (Point, f64) {
    let Some(first) = line.points().next() else {
        return (Point::new(f64::NAN, f64::NAN), f64::NAN);
    };

    let total = length(line);
    if total <= 0.0 {
        return (first, 0.0);
    }

    let mut best = (first, 0.0);
    let mut best_distance = distance(q, first);
    let mut traversed = 0.0;

    for (a, b) in line.points().zip(line.points().skip(1)) {
        let segment = distance(a, b);
        if segment <= 0.0 {
            continue;
        }

        let f = intercept(a, b, q).clamp(0.0, 1.0);
        let candidate = if f <= 0.0 {
            a
        } else if f >= 1.0 {
            b
        } else {
            Geodesic.point_at_ratio_between(a, b, f)
        };

        let d = distance(q, candidate);
        if d < best_distance {
            best_distance = d;
            best = (candidate, (traversed + f * segment) / total);
        }

        traversed += segment;
    }

    best
}

/// Azimuth of the polyline tangent at cumulative-length fraction `f`,
/// in degrees within `[0, 360)`.
///
/// The tangent of a fraction landing exactly on an interior vertex is the
/// bearing of the outgoing segment.
pub fn tangent(line: &LineString, fraction: f64) -> f64 {
    let total = length(line);
    if total <= 0.0 {
        return f64::NAN;
    }

    let mut remaining = fraction.clamp(0.0, 1.0) * total;
    let mut last = None;

    for (a, b) in line.points().zip(line.points().skip(1)) {
        let segment = distance(a, b);
        if segment <= 0.0 {
            continue;
        }

        if remaining < segment {
            return azimuth(a, b);
        }

        remaining -= segment;
        last = Some((a, b));
    }

    // Fraction 1.0: tangent of the final segment.
    last.map_or(f64::NAN, |(a, b)| azimuth(a, b))
}
