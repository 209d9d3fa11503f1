use serde::{Deserialize, Serialize};

/// Latest vehicle state as cached by the telemetry gate.
/// Position and velocity are local NED: z grows downwards, so climbing makes z negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub armed: bool,
    pub guided: bool,
}

impl TelemetrySnapshot {
    pub fn north(&self) -> f64 {
        self.position[0]
    }

    pub fn east(&self) -> f64 {
        self.position[1]
    }

    pub fn down(&self) -> f64 {
        self.position[2]
    }

    pub fn vertical_speed(&self) -> f64 {
        self.velocity[2]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TelemetryEvent {
    PositionUpdated,
    VelocityUpdated,
    VehicleStateUpdated,
}

/// Outbound request to the vehicle (or, for `Stop`, to the connection lifecycle).
/// Every variant is fire-and-forget from the state machine's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    TakeControl,
    ReleaseControl,
    Arm,
    Disarm,
    /// Climb to `altitude` metres above home (positive).
    Takeoff { altitude: f64 },
    Land,
    /// Setpoint in the local frame. `altitude` is positive up; the link negates it for NED.
    CmdPosition { north: f64, east: f64, altitude: f64, heading: f64 },
    /// Ends the connection's receive loop and closes the telemetry log.
    Stop,
}
