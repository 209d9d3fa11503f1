use flyer_proto::telemetry::{TelemetryEvent, TelemetrySnapshot};
use mavlink::common::{MavMessage, MavModeFlag};
use mavlink::MavHeader;

/// Caches the latest vehicle telemetry and turns MAVLink frames into events.
#[derive(Debug, Clone)]
pub struct TelemetryGate {
    target_sys: u8,
    snapshot: TelemetrySnapshot,
}

impl TelemetryGate {
    pub fn new(target_sys: u8) -> Self {
        Self { target_sys, snapshot: TelemetrySnapshot::default() }
    }

    pub fn snapshot(&self) -> &TelemetrySnapshot {
        &self.snapshot
    }

    /// Updates the snapshot and returns the events to dispatch, in delivery order.
    pub fn ingest(&mut self, hdr: &MavHeader, msg: &MavMessage) -> Vec<TelemetryEvent> {
        // other systems on the link (GCS, cameras) are not the vehicle
        if hdr.system_id != self.target_sys {
            return Vec::new();
        }
        match msg {
            MavMessage::LOCAL_POSITION_NED(p) => {
                self.snapshot.position = [p.x as f64, p.y as f64, p.z as f64];
                self.snapshot.velocity = [p.vx as f64, p.vy as f64, p.vz as f64];
                vec![TelemetryEvent::PositionUpdated, TelemetryEvent::VelocityUpdated]
            }
            MavMessage::HEARTBEAT(hb) => {
                let mode = hb.base_mode;
                self.snapshot.armed = mode.contains(MavModeFlag::MAV_MODE_FLAG_SAFETY_ARMED);
                self.snapshot.guided = mode.contains(MavModeFlag::MAV_MODE_FLAG_GUIDED_ENABLED);
                vec![TelemetryEvent::VehicleStateUpdated]
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mavlink::common::{
        MavAutopilot, MavState, MavType, HEARTBEAT_DATA, LOCAL_POSITION_NED_DATA,
    };

    fn hdr(system_id: u8) -> MavHeader {
        MavHeader { system_id, component_id: 1, sequence: 0 }
    }

    fn heartbeat(base_mode: MavModeFlag) -> MavMessage {
        MavMessage::HEARTBEAT(HEARTBEAT_DATA {
            custom_mode: 4,
            mavtype: MavType::MAV_TYPE_QUADROTOR,
            autopilot: MavAutopilot::MAV_AUTOPILOT_ARDUPILOTMEGA,
            base_mode,
            system_status: MavState::MAV_STATE_ACTIVE,
            mavlink_version: 3,
        })
    }

    fn local_position(x: f32, y: f32, z: f32) -> MavMessage {
        MavMessage::LOCAL_POSITION_NED(LOCAL_POSITION_NED_DATA {
            time_boot_ms: 1000,
            x,
            y,
            z,
            vx: 0.5,
            vy: 0.0,
            vz: -0.25,
        })
    }

    #[test]
    fn local_position_fires_position_then_velocity() {
        let mut gate = TelemetryGate::new(1);
        let msg = local_position(1.0, 2.0, -3.0);
        let events = gate.ingest(&hdr(1), &msg);
        assert_eq!(
            events,
            vec![TelemetryEvent::PositionUpdated, TelemetryEvent::VelocityUpdated]
        );
        assert_eq!(gate.snapshot().position, [1.0, 2.0, -3.0]);
        assert_eq!(gate.snapshot().velocity, [0.5, 0.0, -0.25]);
    }

    #[test]
    fn vehicle_heartbeat_updates_flags() {
        let mut gate = TelemetryGate::new(1);
        let mode =
            MavModeFlag::MAV_MODE_FLAG_SAFETY_ARMED | MavModeFlag::MAV_MODE_FLAG_GUIDED_ENABLED;
        let events = gate.ingest(&hdr(1), &heartbeat(mode));
        assert_eq!(events, vec![TelemetryEvent::VehicleStateUpdated]);
        assert!(gate.snapshot().armed);
        assert!(gate.snapshot().guided);

        gate.ingest(&hdr(1), &heartbeat(MavModeFlag::MAV_MODE_FLAG_CUSTOM_MODE_ENABLED));
        assert!(!gate.snapshot().armed);
        assert!(!gate.snapshot().guided);
    }

    #[test]
    fn foreign_heartbeat_is_ignored() {
        let mut gate = TelemetryGate::new(1);
        let events = gate.ingest(&hdr(255), &heartbeat(MavModeFlag::MAV_MODE_FLAG_SAFETY_ARMED));
        assert!(events.is_empty());
        assert!(!gate.snapshot().armed);
    }

    #[test]
    fn foreign_position_is_ignored() {
        let mut gate = TelemetryGate::new(1);
        gate.ingest(&hdr(1), &local_position(1.0, 2.0, -3.0));

        let events = gate.ingest(&hdr(42), &local_position(50.0, 50.0, -10.0));
        assert!(events.is_empty());
        assert_eq!(gate.snapshot().position, [1.0, 2.0, -3.0]);
    }
}
