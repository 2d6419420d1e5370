use std::sync::Arc;

use log::debug;

use crate::markov::{Filter, KState, StateCandidate};
use crate::matcher::{MatcherCandidate, MatcherConfig, MatcherError, MatcherFilter, MatcherSample};
use crate::road::RoadMap;
use crate::route::Path;
use crate::spatial;

/// Outcome of feeding one sample to the matcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Update {
    /// The state vector was replaced with matched candidates.
    Matched,

    /// The sample fell under the minimum-interval or minimum-distance gate
    /// and was skipped; the state is unchanged.
    Gated,

    /// No candidate emitted even at the widest search radius; the state
    /// vector is now empty and the next sample restarts the filter.
    Unmatched,
}

/// Online matcher façade: carries the current state vector between samples
/// and exposes the most probable position and trajectory.
///
/// One `Matcher` serves one trace. Samples must arrive in non-decreasing
/// time order; independent traces get independent matchers over the same
/// shared road map.
pub struct Matcher {
    filter: MatcherFilter,
    window: KState<MatcherCandidate, MatcherSample>,
}

impl Matcher {
    pub fn new(map: Arc<RoadMap>, config: MatcherConfig) -> Matcher {
        let window = KState::new(config.window_frames, config.window_ttl);
        Matcher {
            filter: MatcherFilter::new(map, config),
            window,
        }
    }

    #[inline]
    pub fn config(&self) -> &MatcherConfig {
        self.filter.config()
    }

    /// The current state vector `S_t`.
    #[inline]
    pub fn state(&self) -> &[Arc<MatcherCandidate>] {
        self.window.vector()
    }

    /// Runs one filter step for `sample`, replacing the carried state.
    ///
    /// Degenerate samples (non-finite position) and samples travelling
    /// backwards in time are rejected; gated samples are skipped without
    /// touching the state. When the configured radius yields no candidates
    /// the search widens stepwise up to the configured maximum.
    pub fn update(&mut self, sample: MatcherSample) -> Result<Update, MatcherError> {
        if !sample.point().x().is_finite() || !sample.point().y().is_finite() {
            return Err(MatcherError::DegenerateSample(sample.id().to_string()));
        }

        if let Some(previous) = self.window.sample() {
            if sample.time() < previous.time() {
                return Err(MatcherError::OutOfOrderSample(
                    sample.id().to_string(),
                    previous.time(),
                ));
            }

            let interval = sample.time() - previous.time();
            if self.config().min_interval.is_some_and(|gate| interval < gate) {
                debug!("sample '{}' gated by interval {interval}ms", sample.id());
                return Ok(Update::Gated);
            }

            let moved = spatial::distance(previous.point(), sample.point());
            if self.config().min_distance.is_some_and(|gate| moved < gate) {
                debug!("sample '{}' gated by distance {moved}m", sample.id());
                return Ok(Update::Gated);
            }
        }

        let mut radius = self.config().radius;
        let mut vector =
            self.filter
                .execute(self.window.vector(), self.window.sample(), &sample, Some(radius));

        while vector.is_empty() && radius < self.config().radius_max {
            radius = (radius * 2.0).min(self.config().radius_max);
            debug!("no candidates; widening search radius to {radius}m");
            vector = self
                .filter
                .execute(self.window.vector(), self.window.sample(), &sample, Some(radius));
        }

        let outcome = if vector.is_empty() { Update::Unmatched } else { Update::Matched };
        self.window.update(vector, sample);
        Ok(outcome)
    }

    /// The current most probable position: the candidate with the highest
    /// filter probability.
    pub fn estimate(&self) -> Option<&Arc<MatcherCandidate>> {
        self.window.estimate()
    }

    /// The most probable trajectory so far: transitions along the
    /// predecessor chain of the best-sequence candidate, joined into a
    /// single path.
    ///
    /// The chain is cut wherever an HMM break restarted the filter; the
    /// path then covers the stretch since the last break.
    pub fn trajectory(&self) -> Option<Path> {
        let chain = self.window.sequence();
        let first = chain.first()?;

        let mut path = Path::single(first.point().clone());

        for candidate in &chain[1..] {
            match candidate.transition() {
                Some(transition) => {
                    if path.join(transition.route()).is_err() {
                        path = transition.route().clone();
                    }
                }
                None => path = Path::single(candidate.point().clone()),
            }
        }

        Some(path)
    }
}
