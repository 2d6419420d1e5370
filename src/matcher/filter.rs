use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::debug;

use crate::markov::Filter;
use crate::matcher::{MatcherCandidate, MatcherSample, MatcherTransition};
use crate::road::{RoadMap, RoadPoint};
use crate::route::{Router, Time};
use crate::spatial;

const MS_IN_S: f64 = 1_000.0;

/// Tuning knobs of the map matcher, with the documented defaults.
#[derive(Clone, Debug)]
pub struct MatcherConfig {
    /// Standard deviation of the positional measurement noise, meters.
    pub sigma: f64,

    /// Widening factor applied to `sigma` for samples flagged as GPS
    /// outage.
    pub sigma_outage_scale: f64,

    /// Standard deviation of the heading measurement noise, degrees.
    pub azimuth_sigma: f64,

    /// Scale of the route-length/straight-line deviation in the transition
    /// probability, meters.
    pub beta: f64,

    /// Initial candidate search radius, meters.
    pub radius: f64,

    /// Cap for search-radius widening, meters.
    pub radius_max: f64,

    /// Speed ceiling for the transition bound, meters per second.
    pub max_velocity: f64,

    /// Minimum time between matched samples, ms. Samples arriving earlier
    /// are gated away.
    pub min_interval: Option<i64>,

    /// Minimum distance between matched samples, meters.
    pub min_distance: Option<f64>,

    /// Count bound `k` of the state window.
    pub window_frames: Option<usize>,

    /// Time bound `τ` of the state window, ms.
    pub window_ttl: Option<i64>,
}

impl Default for MatcherConfig {
    fn default() -> MatcherConfig {
        MatcherConfig {
            sigma: 5.0,
            sigma_outage_scale: 3.0,
            azimuth_sigma: 25.0,
            beta: 5.0,
            radius: 200.0,
            radius_max: 500.0,
            max_velocity: 130.0 / 3.6,
            min_interval: None,
            min_distance: None,
            window_frames: None,
            window_ttl: None,
        }
    }
}

/// Gaussian density of `x` under a zero-mean normal with deviation `sigma`.
#[inline]
fn gaussian(x: f64, sigma: f64) -> f64 {
    (sigma * (2.0 * std::f64::consts::PI).sqrt()).recip() * (-0.5 * (x / sigma).powi(2)).exp()
}

/// Wrapped-normal density of an angular difference, degrees.
///
/// `delta` is reduced to the principal branch `[-180, 180)`; one wrap term
/// on either side keeps the density smooth across it.
fn wrapped_normal(delta: f64, sigma: f64) -> f64 {
    let principal = (delta + 180.0).rem_euclid(360.0) - 180.0;

    (-1..=1)
        .map(|k| gaussian(principal + 360.0 * k as f64, sigma))
        .sum()
}

/// The road-bound HMM filter: emission from the spatial index, transitions
/// from the bounded router.
pub struct MatcherFilter {
    router: Router,
    config: MatcherConfig,

    /// Candidate id allocator; monotone, so reruns over the same samples
    /// label candidates identically.
    ids: AtomicU64,
}

impl MatcherFilter {
    pub fn new(map: Arc<RoadMap>, config: MatcherConfig) -> MatcherFilter {
        MatcherFilter {
            router: Router::new(map),
            config,
            ids: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    #[inline]
    pub fn map(&self) -> &Arc<RoadMap> {
        self.router.map()
    }

    fn next_id(&self) -> u64 {
        self.ids.fetch_add(1, Ordering::Relaxed)
    }

    /// Emission probability of a road point for a sample.
    ///
    /// A zero-mean Gaussian of the geodesic distance, widened for outage
    /// samples, multiplied by a wrapped normal of the heading difference
    /// whenever the sample carries an azimuth.
    fn emission(&self, sample: &MatcherSample, point: &RoadPoint) -> f64 {
        let mut sigma = self.config.sigma;
        if sample.gps_outage() {
            sigma *= self.config.sigma_outage_scale;
            debug!("gps outage at time {}: sigma widened to {sigma}", sample.time());
        }

        let distance = spatial::distance(sample.point(), point.position());
        let mut emission = gaussian(distance, sigma);

        if sample.azimuth().is_finite() {
            let delta = sample.azimuth() - point.azimuth();
            emission *= wrapped_normal(delta, self.config.azimuth_sigma);
        }

        emission
    }

    /// Transition probability: an exponential of how far the route length
    /// deviates from the straight-line movement between the two samples.
    fn probability(&self, previous: &MatcherSample, sample: &MatcherSample, length: f64) -> f64 {
        let straight = spatial::distance(previous.point(), sample.point());
        (1.0 / self.config.beta) * (-(length - straight).abs() / self.config.beta).exp()
    }
}

impl Filter for MatcherFilter {
    type Candidate = MatcherCandidate;
    type Transition = MatcherTransition;
    type Sample = MatcherSample;

    fn candidates(
        &self,
        _predecessors: &[Arc<MatcherCandidate>],
        sample: &MatcherSample,
        radius: Option<f64>,
    ) -> Vec<(MatcherCandidate, f64)> {
        let radius = radius.unwrap_or(self.config.radius);

        self.map()
            .radius(sample.point(), radius)
            .into_iter()
            .map(|point| {
                let emission = self.emission(sample, &point);
                let candidate = MatcherCandidate::new(self.next_id(), point)
                    .with_sample(sample.clone());
                (candidate, emission)
            })
            .collect()
    }

    fn transition(
        &self,
        predecessor: (&MatcherSample, &Arc<MatcherCandidate>),
        candidate: (&MatcherSample, &MatcherCandidate),
    ) -> Option<(MatcherTransition, f64)> {
        let (previous, predecessor) = predecessor;
        let (sample, candidate) = candidate;

        let dt = (sample.time() - previous.time()) as f64 / MS_IN_S;
        if dt <= 0.0 {
            return None;
        }

        let routes = self.router.route_within_time(
            predecessor.point(),
            std::slice::from_ref(candidate.point()),
            &Time,
            dt,
            Some(self.config.max_velocity),
        );

        let route = routes.into_iter().next().flatten()?;
        let probability = self.probability(previous, sample, route.length());

        Some((MatcherTransition::new(route), probability))
    }

    /// One bounded multi-target routing request per predecessor, instead of
    /// one search per pair.
    fn transitions(
        &self,
        predecessors: (&MatcherSample, &[Arc<MatcherCandidate>]),
        candidates: (&MatcherSample, &[(MatcherCandidate, f64)]),
    ) -> Vec<Vec<Option<(MatcherTransition, f64)>>> {
        let (previous, predecessors) = predecessors;
        let (sample, candidates) = candidates;

        let dt = (sample.time() - previous.time()) as f64 / MS_IN_S;
        if dt <= 0.0 {
            return vec![vec![None; candidates.len()]; predecessors.len()];
        }

        let targets = candidates
            .iter()
            .map(|(candidate, _)| candidate.point().clone())
            .collect::<Vec<_>>();

        predecessors
            .iter()
            .map(|predecessor| {
                self.router
                    .route_within_time(
                        predecessor.point(),
                        &targets,
                        &Time,
                        dt,
                        Some(self.config.max_velocity),
                    )
                    .into_iter()
                    .map(|route| {
                        route.map(|route| {
                            let probability = self.probability(previous, sample, route.length());
                            (MatcherTransition::new(route), probability)
                        })
                    })
                    .collect()
            })
            .collect()
    }
}
