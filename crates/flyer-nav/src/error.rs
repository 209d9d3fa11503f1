use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlightError {
    #[error("waypoint index {index} out of range (route has {len} waypoints)")]
    OutOfRange { index: usize, len: usize },
}
