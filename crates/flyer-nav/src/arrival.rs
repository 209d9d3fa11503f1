/// Per-axis deadband used for waypoint arrival.
pub const ARRIVAL_EPSILON: f64 = 0.05;

/// True when `current` is strictly within [`ARRIVAL_EPSILON`] of `target`.
pub fn inbound(current: f64, target: f64) -> bool {
    (target - current).abs() < ARRIVAL_EPSILON
}
