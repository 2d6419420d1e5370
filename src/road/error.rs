use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoadError {
    #[error("road {0} carries fewer than two geometry vertices")]
    TruncatedGeometry(i64),

    #[error("road {0} has zero-length geometry")]
    DegenerateGeometry(i64),

    #[error("road {0} has a non-positive maximum speed")]
    InvalidMaxspeed(i64),

    #[error("road {0} has a priority factor below one")]
    InvalidPriority(i64),

    #[error("duplicate road identifier {0}")]
    DuplicateRoad(i64),
}
