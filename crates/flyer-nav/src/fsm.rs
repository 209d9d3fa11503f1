use flyer_proto::telemetry::{Command, TelemetryEvent, TelemetrySnapshot};
use tracing::{debug, info};

use crate::arrival::inbound;
use crate::context::{FlightContext, FlightState, MissionParams};
use crate::error::FlightError;
use crate::planner::plan_box;

/// Box-patrol controller. Each telemetry event is matched against the current
/// state; the commands to issue are returned in order.
#[derive(Debug, Clone)]
pub struct FlightStateMachine {
    ctx: FlightContext,
}

impl FlightStateMachine {
    pub fn new(params: MissionParams) -> Self {
        Self { ctx: FlightContext::new(params) }
    }

    /// Resume from an existing context (used to start from a given state).
    pub fn from_context(ctx: FlightContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &FlightContext {
        &self.ctx
    }

    pub fn state(&self) -> FlightState {
        self.ctx.state
    }

    pub fn in_mission(&self) -> bool {
        self.ctx.in_mission
    }

    pub fn handle(
        &mut self,
        event: TelemetryEvent,
        telemetry: &TelemetrySnapshot,
    ) -> Result<Vec<Command>, FlightError> {
        use FlightState::*;
        use TelemetryEvent::*;

        let mut cmds = Vec::new();
        match (event, self.ctx.state) {
            (VehicleStateUpdated, _) if !self.ctx.in_mission => {}
            (VehicleStateUpdated, Manual) => self.arming_transition(&mut cmds),
            (VehicleStateUpdated, Arming) => self.takeoff_transition(&mut cmds),
            (PositionUpdated, Takeoff) => {
                if self.altitude_reached(telemetry) {
                    info!("takeoff complete at z={:.2}", telemetry.down());
                    self.ctx.state = Waypoint;
                    self.waypoint_transition(telemetry, &mut cmds)?;
                }
            }
            (PositionUpdated, Waypoint) => self.waypoint_transition(telemetry, &mut cmds)?,
            (VelocityUpdated, Landing) => {
                if self.touched_down(telemetry) {
                    self.disarming_transition(&mut cmds);
                    self.manual_transition(&mut cmds);
                }
            }
            (VehicleStateUpdated, Takeoff | Waypoint | Landing | Disarming)
            | (PositionUpdated, Manual | Arming | Landing | Disarming)
            | (VelocityUpdated, Manual | Arming | Takeoff | Waypoint | Disarming) => {}
        }
        Ok(cmds)
    }

    // Within ±10% of the target altitude (z is negative while airborne).
    fn altitude_reached(&self, t: &TelemetrySnapshot) -> bool {
        let h = self.ctx.params.target_height;
        -1.1 * h < t.down() && t.down() < -0.9 * h
    }

    fn touched_down(&self, t: &TelemetrySnapshot) -> bool {
        let floor_half = (self.ctx.params.target_height / 2.0).floor();
        t.vertical_speed().abs() < 0.01 && t.down().abs() < floor_half
    }

    fn arming_transition(&mut self, cmds: &mut Vec<Command>) {
        info!("arming transition");
        cmds.push(Command::TakeControl);
        cmds.push(Command::Arm);
        self.ctx.state = FlightState::Arming;
    }

    fn takeoff_transition(&mut self, cmds: &mut Vec<Command>) {
        info!("takeoff transition");
        cmds.push(Command::Takeoff { altitude: self.ctx.params.target_height });
        self.ctx.state = FlightState::Takeoff;
    }

    fn waypoint_transition(
        &mut self,
        t: &TelemetrySnapshot,
        cmds: &mut Vec<Command>,
    ) -> Result<(), FlightError> {
        if self.ctx.waypoints.is_empty() {
            let params = self.ctx.params;
            self.ctx.waypoints =
                plan_box((t.north(), t.east()), params.target_height, params.target_side);
            info!("waypoint transition: box planned {:?}", self.ctx.waypoints);
        }

        match self.ctx.current_waypoint() {
            Ok(target) => {
                if inbound(t.north(), target.north) && inbound(t.east(), target.east) {
                    self.ctx.cursor += 1;
                    info!(
                        "reached waypoint {} ({:.2}, {:.2})",
                        self.ctx.cursor, target.north, target.east
                    );
                }
                // Still the pre-increment target; the next corner goes out on the following update.
                debug!("setpoint {:?}", target);
                cmds.push(Command::CmdPosition {
                    north: target.north,
                    east: target.east,
                    altitude: target.altitude,
                    heading: 0.0,
                });
            }
            Err(_) if self.ctx.route_complete() => {}
            Err(e) => return Err(e),
        }

        if self.ctx.route_complete() {
            self.landing_transition(cmds);
        }
        Ok(())
    }

    fn landing_transition(&mut self, cmds: &mut Vec<Command>) {
        info!("landing transition");
        cmds.push(Command::Land);
        self.ctx.state = FlightState::Landing;
    }

    fn disarming_transition(&mut self, cmds: &mut Vec<Command>) {
        info!("disarm transition");
        cmds.push(Command::Disarm);
        self.ctx.state = FlightState::Disarming;
    }

    fn manual_transition(&mut self, cmds: &mut Vec<Command>) {
        info!("manual transition");
        cmds.push(Command::ReleaseControl);
        cmds.push(Command::Stop);
        self.ctx.end_mission();
    }
}
