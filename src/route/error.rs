use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("path carries no edges")]
    Empty,

    #[error("first path edge {0} does not carry the source point")]
    SourceMismatch(i64),

    #[error("last path edge {0} does not carry the target point")]
    TargetMismatch(i64),

    #[error("edge {0} does not connect to edge {1}")]
    Disconnected(i64, i64),

    #[error("single-edge path runs backwards (source fraction exceeds target fraction)")]
    BackwardOnEdge,

    #[error("paths do not share a joinable endpoint")]
    JoinMismatch,
}
