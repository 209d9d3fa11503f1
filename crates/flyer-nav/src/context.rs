use serde::{Deserialize, Serialize};

use crate::error::FlightError;
use crate::planner::{Waypoint, BOX_CORNERS};

/// Index of the final box corner. The route is finished once the cursor passes it.
pub const LAST_WAYPOINT: usize = BOX_CORNERS - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightState {
    Manual,
    Arming,
    Takeoff,
    Waypoint,
    Landing,
    Disarming,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionParams {
    /// Metres above home, positive.
    pub target_height: f64,
    /// Box side length in metres.
    pub target_side: f64,
}

impl Default for MissionParams {
    fn default() -> Self {
        Self { target_height: 3.0, target_side: 10.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightContext {
    pub state: FlightState,
    /// Empty until the first waypoint transition, then fixed for the rest of the mission.
    pub waypoints: Vec<Waypoint>,
    pub cursor: usize,
    pub params: MissionParams,
    pub in_mission: bool,
}

impl FlightContext {
    pub fn new(params: MissionParams) -> Self {
        Self {
            state: FlightState::Manual,
            waypoints: Vec::new(),
            cursor: 0,
            params,
            in_mission: true,
        }
    }

    pub fn waypoint(&self, index: usize) -> Result<Waypoint, FlightError> {
        self.waypoints
            .get(index)
            .copied()
            .ok_or(FlightError::OutOfRange { index, len: self.waypoints.len() })
    }

    pub fn current_waypoint(&self) -> Result<Waypoint, FlightError> {
        self.waypoint(self.cursor)
    }

    pub fn route_complete(&self) -> bool {
        self.cursor > LAST_WAYPOINT
    }

    pub(crate) fn end_mission(&mut self) {
        self.waypoints.clear();
        self.cursor = 0;
        self.in_mission = false;
        self.state = FlightState::Manual;
    }
}
