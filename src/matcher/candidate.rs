use std::sync::Arc;

use crate::markov::{StateCandidate, StateTransition};
use crate::matcher::MatcherSample;
use crate::road::RoadPoint;
use crate::route::Path;

/// Transition between two matching candidates of consecutive samples,
/// carrying the route the vehicle is inferred to have taken.
#[derive(Clone, Debug)]
pub struct MatcherTransition {
    route: Path,
}

impl MatcherTransition {
    pub fn new(route: Path) -> MatcherTransition {
        MatcherTransition { route }
    }

    #[inline]
    pub fn route(&self) -> &Path {
        &self.route
    }
}

impl StateTransition for MatcherTransition {
    fn hops(&self) -> usize {
        self.route.size()
    }
}

/// A matching candidate: one hypothesized on-road position for a sample.
///
/// The candidate owns its inbound transition; the predecessor is a shared
/// back-reference into the previous state vector, kept alive by the
/// matcher's state window.
#[derive(Debug)]
pub struct MatcherCandidate {
    id: u64,
    point: RoadPoint,
    sample: Option<MatcherSample>,

    filtprob: f64,
    seqprob: f64,
    time: Option<i64>,
    predecessor: Option<Arc<MatcherCandidate>>,
    transition: Option<MatcherTransition>,
}

impl MatcherCandidate {
    pub fn new(id: u64, point: RoadPoint) -> MatcherCandidate {
        MatcherCandidate {
            id,
            point,
            sample: None,
            filtprob: 0.0,
            seqprob: f64::NEG_INFINITY,
            time: None,
            predecessor: None,
            transition: None,
        }
    }

    pub fn with_sample(mut self, sample: MatcherSample) -> MatcherCandidate {
        self.sample = Some(sample);
        self
    }

    pub(crate) fn with_state(mut self, filtprob: f64, seqprob: f64) -> MatcherCandidate {
        self.filtprob = filtprob;
        self.seqprob = seqprob;
        self
    }

    pub(crate) fn with_time(mut self, time: Option<i64>) -> MatcherCandidate {
        self.time = time;
        self
    }

    pub(crate) fn with_predecessor(
        mut self,
        predecessor: Option<Arc<MatcherCandidate>>,
    ) -> MatcherCandidate {
        self.predecessor = predecessor;
        self
    }

    pub(crate) fn with_transition(mut self, transition: Option<MatcherTransition>) -> MatcherCandidate {
        self.transition = transition;
        self
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The on-road position this candidate hypothesizes.
    #[inline]
    pub fn point(&self) -> &RoadPoint {
        &self.point
    }

    #[inline]
    pub fn sample(&self) -> Option<&MatcherSample> {
        self.sample.as_ref()
    }
}

impl StateCandidate for MatcherCandidate {
    type Transition = MatcherTransition;
    type Sample = MatcherSample;

    fn filtprob(&self) -> f64 {
        self.filtprob
    }

    fn set_filtprob(&mut self, filtprob: f64) {
        self.filtprob = filtprob;
    }

    fn seqprob(&self) -> f64 {
        self.seqprob
    }

    fn set_seqprob(&mut self, seqprob: f64) {
        self.seqprob = seqprob;
    }

    fn time(&self) -> Option<i64> {
        self.time
    }

    fn set_time(&mut self, time: i64) {
        self.time = Some(time);
    }

    fn predecessor(&self) -> Option<&Arc<MatcherCandidate>> {
        self.predecessor.as_ref()
    }

    fn set_predecessor(&mut self, predecessor: Option<Arc<MatcherCandidate>>) {
        self.predecessor = predecessor;
    }

    fn transition(&self) -> Option<&MatcherTransition> {
        self.transition.as_ref()
    }

    fn set_transition(&mut self, transition: Option<MatcherTransition>) {
        self.transition = transition;
    }

    fn ident(&self) -> i64 {
        self.point.edge().id()
    }
}
