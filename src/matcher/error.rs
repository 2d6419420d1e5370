use thiserror::Error;

use crate::route::PathError;

#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("sample '{0}' carries a non-finite position")]
    DegenerateSample(String),

    #[error("sample '{0}' precedes the current state at time {1}")]
    OutOfOrderSample(String, i64),
}

/// Failures while importing persisted state.
#[derive(Error, Debug)]
pub enum JsonError {
    #[error(transparent)]
    Parse(#[from] serde_json::Error),

    #[error("unparsable WKT point: {0}")]
    InvalidPoint(String),

    #[error("unknown edge {0} in persisted state")]
    UnknownEdge(i64),

    #[error("unknown predecessor candidate '{0}' in persisted state")]
    UnknownCandidate(String),

    #[error("unparsable candidate identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("persisted route is invalid: {0}")]
    InvalidRoute(#[from] PathError),
}
