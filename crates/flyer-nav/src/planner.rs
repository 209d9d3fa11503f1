use serde::{Deserialize, Serialize};

/// Number of corners in the box pattern.
pub const BOX_CORNERS: usize = 4;

/// A setpoint in the local frame; `altitude` is positive up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub north: f64,
    pub east: f64,
    pub altitude: f64,
}

impl Waypoint {
    pub fn new(north: f64, east: f64, altitude: f64) -> Self {
        Self { north, east, altitude }
    }
}

// Square with side `side`, first leg +side along east, closing back on the origin.
pub fn plan_box(origin: (f64, f64), height: f64, side: f64) -> Vec<Waypoint> {
    let (x0, y0) = origin;
    vec![
        Waypoint::new(x0, y0 + side, height),
        Waypoint::new(x0 + side, y0 + side, height),
        Waypoint::new(x0 + side, y0, height),
        Waypoint::new(x0, y0, height),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_from_home() {
        let wps = plan_box((0.0, 0.0), 3.0, 10.0);
        assert_eq!(
            wps,
            vec![
                Waypoint::new(0.0, 10.0, 3.0),
                Waypoint::new(10.0, 10.0, 3.0),
                Waypoint::new(10.0, 0.0, 3.0),
                Waypoint::new(0.0, 0.0, 3.0),
            ]
        );
    }

    #[test]
    fn box_is_anchored_at_origin() {
        let wps = plan_box((2.5, -1.0), 5.0, 4.0);
        assert_eq!(wps.len(), BOX_CORNERS);
        assert_eq!(wps[0], Waypoint::new(2.5, 3.0, 5.0));
        assert_eq!(wps[2], Waypoint::new(6.5, -1.0, 5.0));
        // closes on the start point
        assert_eq!(wps[3], Waypoint::new(2.5, -1.0, 5.0));
        assert!(wps.iter().all(|w| w.altitude == 5.0));
    }
}
