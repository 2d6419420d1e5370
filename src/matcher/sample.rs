use geo::Point;

use crate::markov;
use crate::spatial;

/// A position measurement, e.g. from a GPS device.
///
/// Only `time` and `point` are mandatory; the remaining scalar fields use
/// `NaN` as their absent sentinel, matching the wire format. Samples are
/// immutable: they are produced by ingestion, consumed once per filter
/// step, and never change afterwards.
#[derive(Clone, Debug)]
pub struct MatcherSample {
    id: String,
    time: i64,
    point: Point,
    azimuth: f64,
    gps_outage: bool,
    velocity: f64,
    accuracy: f64,
    trace_id: Option<String>,
}

impl MatcherSample {
    /// A bare sample of a measured position and time (ms epoch).
    pub fn new(time: i64, point: Point) -> MatcherSample {
        MatcherSample {
            id: String::new(),
            time,
            point,
            azimuth: f64::NAN,
            gps_outage: false,
            velocity: f64::NAN,
            accuracy: f64::NAN,
            trace_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> MatcherSample {
        self.id = id.into();
        self
    }

    /// Sets the measured heading; normalized into `[0, 360)` on the way in.
    pub fn with_azimuth(mut self, azimuth: f64) -> MatcherSample {
        self.azimuth = spatial::normalize_azimuth(azimuth);
        self
    }

    pub fn with_gps_outage(mut self, gps_outage: bool) -> MatcherSample {
        self.gps_outage = gps_outage;
        self
    }

    /// Measured speed in meters per second.
    pub fn with_velocity(mut self, velocity: f64) -> MatcherSample {
        self.velocity = velocity;
        self
    }

    /// Reported standard deviation of the position measurement.
    pub fn with_accuracy(mut self, accuracy: f64) -> MatcherSample {
        self.accuracy = accuracy;
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> MatcherSample {
        self.trace_id = Some(trace_id.into());
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn time(&self) -> i64 {
        self.time
    }

    #[inline]
    pub fn point(&self) -> Point {
        self.point
    }

    /// Measured heading in `[0, 360)`, or `NaN` when absent.
    #[inline]
    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    #[inline]
    pub fn gps_outage(&self) -> bool {
        self.gps_outage
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    #[inline]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }
}

impl markov::Sample for MatcherSample {
    fn time(&self) -> i64 {
        self.time
    }
}
