//! Persisted-state JSON interchange.
//!
//! Wire reprs are kept separate from the domain types: samples round-trip
//! standalone, while candidates reference road edges and predecessor
//! candidates by identifier and are resolved against a [`RoadMap`] and the
//! already-imported candidates on the way back in.

use std::sync::Arc;

use geo::Point;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use wkt::{ToWkt, TryFromWkt};

use crate::markov::StateCandidate;
use crate::matcher::{JsonError, MatcherCandidate, MatcherSample, MatcherTransition};
use crate::road::{RoadMap, RoadPoint};
use crate::route::Path;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleRepr {
    #[serde(default)]
    pub id: String,
    pub time: i64,
    /// WKT-encoded position, e.g. `POINT(11.5 48.1)`.
    pub point: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azimuth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps_outage: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl From<&MatcherSample> for SampleRepr {
    fn from(sample: &MatcherSample) -> SampleRepr {
        SampleRepr {
            id: sample.id().to_string(),
            time: sample.time(),
            point: sample.point().wkt_string(),
            azimuth: sample.azimuth().is_finite().then(|| sample.azimuth()),
            gps_outage: sample.gps_outage().then_some(true),
            velocity: sample.velocity().is_finite().then(|| sample.velocity()),
            accuracy: sample.accuracy().is_finite().then(|| sample.accuracy()),
            trace_id: sample.trace_id().map(str::to_string),
        }
    }
}

impl TryFrom<SampleRepr> for MatcherSample {
    type Error = JsonError;

    fn try_from(repr: SampleRepr) -> Result<MatcherSample, JsonError> {
        let point = Point::try_from_wkt_str(&repr.point)
            .map_err(|_| JsonError::InvalidPoint(repr.point.clone()))?;

        let mut sample = MatcherSample::new(repr.time, point).with_id(repr.id);
        if let Some(azimuth) = repr.azimuth {
            sample = sample.with_azimuth(azimuth);
        }
        if let Some(gps_outage) = repr.gps_outage {
            sample = sample.with_gps_outage(gps_outage);
        }
        if let Some(velocity) = repr.velocity {
            sample = sample.with_velocity(velocity);
        }
        if let Some(accuracy) = repr.accuracy {
            sample = sample.with_accuracy(accuracy);
        }
        if let Some(trace_id) = repr.trace_id {
            sample = sample.with_trace_id(trace_id);
        }

        Ok(sample)
    }
}

impl MatcherSample {
    pub fn to_json(&self) -> Result<String, JsonError> {
        Ok(serde_json::to_string(&SampleRepr::from(self))?)
    }

    pub fn from_json(json: &str) -> Result<MatcherSample, JsonError> {
        serde_json::from_str::<SampleRepr>(json)?.try_into()
    }
}

#[derive(Serialize, Deserialize)]
pub struct RoadPointRepr {
    /// Directed edge id: even forward, odd backward sibling.
    pub road: i64,
    pub fraction: f64,
}

impl From<&RoadPoint> for RoadPointRepr {
    fn from(point: &RoadPoint) -> RoadPointRepr {
        RoadPointRepr {
            road: point.edge().id(),
            fraction: point.fraction(),
        }
    }
}

impl RoadPointRepr {
    fn resolve(&self, map: &RoadMap) -> Result<RoadPoint, JsonError> {
        let road = map.edge(self.road).ok_or(JsonError::UnknownEdge(self.road))?;
        Ok(RoadPoint::new(Arc::clone(road), self.fraction))
    }
}

#[derive(Serialize, Deserialize)]
pub struct RouteRepr {
    pub source: RoadPointRepr,
    pub target: RoadPointRepr,
    pub roads: Vec<i64>,
}

#[derive(Serialize, Deserialize)]
pub struct TransitionRepr {
    pub route: RouteRepr,
}

impl From<&MatcherTransition> for TransitionRepr {
    fn from(transition: &MatcherTransition) -> TransitionRepr {
        let route = transition.route();
        TransitionRepr {
            route: RouteRepr {
                source: route.source().into(),
                target: route.target().into(),
                roads: route.edges().iter().map(|edge| edge.id()).collect(),
            },
        }
    }
}

impl TransitionRepr {
    fn resolve(&self, map: &RoadMap) -> Result<MatcherTransition, JsonError> {
        let source = self.route.source.resolve(map)?;
        let target = self.route.target.resolve(map)?;

        let edges = self
            .route
            .roads
            .iter()
            .map(|id| {
                map.edge(*id)
                    .map(Arc::clone)
                    .ok_or(JsonError::UnknownEdge(*id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MatcherTransition::new(Path::new(source, target, edges)?))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRepr {
    pub id: String,
    pub filtprob: f64,
    pub seqprob: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<TransitionRepr>,
    pub roadpoint: RoadPointRepr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<SampleRepr>,
}

impl From<&MatcherCandidate> for CandidateRepr {
    fn from(candidate: &MatcherCandidate) -> CandidateRepr {
        CandidateRepr {
            id: candidate.id().to_string(),
            filtprob: candidate.filtprob(),
            seqprob: candidate.seqprob(),
            predecessor: candidate.predecessor().map(|p| p.id().to_string()),
            transition: candidate.transition().map(TransitionRepr::from),
            roadpoint: candidate.point().into(),
            time: candidate.time(),
            sample: candidate.sample().map(SampleRepr::from),
        }
    }
}

impl MatcherCandidate {
    pub fn to_json(&self) -> Result<String, JsonError> {
        Ok(serde_json::to_string(&CandidateRepr::from(self))?)
    }

    /// Imports a persisted candidate, resolving edge ids against `map` and
    /// the predecessor reference against the candidates imported so far.
    pub fn from_json(
        json: &str,
        map: &RoadMap,
        imported: &FxHashMap<u64, Arc<MatcherCandidate>>,
    ) -> Result<MatcherCandidate, JsonError> {
        let repr = serde_json::from_str::<CandidateRepr>(json)?;

        let id = repr
            .id
            .parse::<u64>()
            .map_err(|_| JsonError::InvalidIdentifier(repr.id.clone()))?;

        let predecessor = repr
            .predecessor
            .map(|reference| {
                let key = reference
                    .parse::<u64>()
                    .map_err(|_| JsonError::InvalidIdentifier(reference.clone()))?;
                imported
                    .get(&key)
                    .map(Arc::clone)
                    .ok_or(JsonError::UnknownCandidate(reference))
            })
            .transpose()?;

        let transition = repr
            .transition
            .map(|transition| transition.resolve(map))
            .transpose()?;

        let sample = repr
            .sample
            .map(MatcherSample::try_from)
            .transpose()?;

        let mut candidate = MatcherCandidate::new(id, repr.roadpoint.resolve(map)?)
            .with_state(repr.filtprob, repr.seqprob)
            .with_time(repr.time)
            .with_predecessor(predecessor)
            .with_transition(transition);

        if let Some(sample) = sample {
            candidate = candidate.with_sample(sample);
        }

        Ok(candidate)
    }
}
