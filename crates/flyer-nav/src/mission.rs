use anyhow::{Context, Result};
use flyer_proto::telemetry::{Command, TelemetryEvent, TelemetrySnapshot};

use crate::context::MissionParams;
use crate::fsm::FlightStateMachine;

/// Outbound side: whatever actually talks to the vehicle.
pub trait VehicleCommander {
    fn execute(&mut self, cmd: &Command) -> Result<()>;
}

/// Inbound side: receives telemetry notifications from a dispatcher.
pub trait TelemetryObserver {
    fn on_event(&mut self, event: TelemetryEvent, telemetry: &TelemetrySnapshot) -> Result<()>;
}

/// Binds a state machine to a commander and forwards every command it emits.
pub struct Mission<C> {
    fsm: FlightStateMachine,
    commander: C,
}

impl<C: VehicleCommander> Mission<C> {
    pub fn new(params: MissionParams, commander: C) -> Self {
        Self { fsm: FlightStateMachine::new(params), commander }
    }

    pub fn fsm(&self) -> &FlightStateMachine {
        &self.fsm
    }

    pub fn commander(&self) -> &C {
        &self.commander
    }

    pub fn is_finished(&self) -> bool {
        !self.fsm.in_mission()
    }
}

impl<C: VehicleCommander> TelemetryObserver for Mission<C> {
    fn on_event(&mut self, event: TelemetryEvent, telemetry: &TelemetrySnapshot) -> Result<()> {
        let cmds = self
            .fsm
            .handle(event, telemetry)
            .with_context(|| format!("{:?} in {:?}", event, self.fsm.state()))?;
        for cmd in &cmds {
            self.commander.execute(cmd).with_context(|| format!("command {:?}", cmd))?;
        }
        Ok(())
    }
}
