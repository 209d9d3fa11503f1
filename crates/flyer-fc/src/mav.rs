use anyhow::{Context, Result};
use flyer_nav::VehicleCommander;
use flyer_proto::telemetry::Command;
use mavlink::{
    common::{
        MavAutopilot, MavCmd, MavFrame, MavMessage, MavModeFlag, MavState, MavType,
        PositionTargetTypemask, COMMAND_LONG_DATA, HEARTBEAT_DATA,
        SET_POSITION_TARGET_LOCAL_NED_DATA,
    },
    MavConnection, MavHeader,
};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::LinkConfig;

/// ArduCopter custom modes used for taking and releasing control.
pub const COPTER_MODE_STABILIZE: u32 = 0;
pub const COPTER_MODE_GUIDED: u32 = 4;

// Position only: ignore velocity, acceleration and yaw rate.
const POSITION_ONLY_MASK: u16 = 0b0000_1001_1111_1000;

/// Shared handle to the vehicle connection. Clones talk over the same socket,
/// so the receive loop and the command side can live in different owners.
#[derive(Clone)]
pub struct FcLink {
    conn: Arc<dyn MavConnection<MavMessage> + Send + Sync>,
    sys_id: u8,
    comp_id: u8,
    sequence: Arc<AtomicU8>,
    target_sys: u8,
    target_comp: u8,
    require_heartbeat: bool,
    seen_heartbeat: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
}

impl FcLink {
    pub fn connect(url: &str, cfg: &LinkConfig) -> Result<Self> {
        let conn = mavlink::connect::<MavMessage>(url)
            .with_context(|| format!("mavlink connect {}", url))?;
        info!("FC: connected to {}", url);

        Ok(Self {
            conn: Arc::from(conn),
            sys_id: cfg.sys_id,
            comp_id: cfg.comp_id,
            sequence: Arc::new(AtomicU8::new(0)),
            target_sys: cfg.target_sys,
            target_comp: cfg.target_comp,
            require_heartbeat: cfg.require_heartbeat,
            seen_heartbeat: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn target_sys(&self) -> u8 {
        self.target_sys
    }

    /// Blocks until the next frame arrives.
    pub fn recv(&self) -> Result<(MavHeader, MavMessage), mavlink::error::MessageReadError> {
        self.conn.recv()
    }

    pub fn mark_heartbeat(&self) {
        self.seen_heartbeat.store(true, Ordering::Relaxed);
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn send_heartbeat(&self) -> Result<()> {
        let hb = HEARTBEAT_DATA {
            custom_mode: 0,
            mavtype: MavType::MAV_TYPE_GCS,
            autopilot: MavAutopilot::MAV_AUTOPILOT_INVALID,
            base_mode: MavModeFlag::MAV_MODE_FLAG_CUSTOM_MODE_ENABLED,
            system_status: MavState::MAV_STATE_ACTIVE,
            mavlink_version: 3,
        };
        self.send(MavMessage::HEARTBEAT(hb))
    }

    fn send(&self, msg: MavMessage) -> Result<()> {
        let hdr = MavHeader {
            system_id: self.sys_id,
            component_id: self.comp_id,
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
        };
        self.conn.send(&hdr, &msg).context("mavlink send")?;
        Ok(())
    }
}

impl VehicleCommander for FcLink {
    fn execute(&mut self, cmd: &Command) -> Result<()> {
        let Some(msg) = encode_command(cmd, self.target_sys, self.target_comp) else {
            info!("FC: stop requested");
            self.request_stop();
            return Ok(());
        };
        if self.require_heartbeat && !self.seen_heartbeat.load(Ordering::Relaxed) {
            anyhow::bail!("refusing {:?}: no heartbeat seen yet", cmd);
        }
        debug!("FC: sending {:?}", cmd);
        self.send(msg)
    }
}

/// Wire form of a vehicle command. `Stop` has none: it only ends the local session.
pub fn encode_command(cmd: &Command, target_sys: u8, target_comp: u8) -> Option<MavMessage> {
    let long = |command: MavCmd, param1: f32, param2: f32, param7: f32| {
        MavMessage::COMMAND_LONG(COMMAND_LONG_DATA {
            target_system: target_sys,
            target_component: target_comp,
            command,
            confirmation: 0,
            param1,
            param2,
            param3: 0.0,
            param4: 0.0,
            param5: 0.0,
            param6: 0.0,
            param7,
        })
    };
    let custom_mode = MavModeFlag::MAV_MODE_FLAG_CUSTOM_MODE_ENABLED.bits() as f32;

    let msg = match *cmd {
        Command::TakeControl => {
            long(MavCmd::MAV_CMD_DO_SET_MODE, custom_mode, COPTER_MODE_GUIDED as f32, 0.0)
        }
        Command::ReleaseControl => {
            long(MavCmd::MAV_CMD_DO_SET_MODE, custom_mode, COPTER_MODE_STABILIZE as f32, 0.0)
        }
        Command::Arm => long(MavCmd::MAV_CMD_COMPONENT_ARM_DISARM, 1.0, 0.0, 0.0),
        Command::Disarm => long(MavCmd::MAV_CMD_COMPONENT_ARM_DISARM, 0.0, 0.0, 0.0),
        Command::Takeoff { altitude } => {
            long(MavCmd::MAV_CMD_NAV_TAKEOFF, 0.0, 0.0, altitude as f32)
        }
        Command::Land => long(MavCmd::MAV_CMD_NAV_LAND, 0.0, 0.0, 0.0),
        Command::CmdPosition { north, east, altitude, heading } => {
            MavMessage::SET_POSITION_TARGET_LOCAL_NED(SET_POSITION_TARGET_LOCAL_NED_DATA {
                time_boot_ms: 0,
                x: north as f32,
                y: east as f32,
                z: -altitude as f32,
                vx: 0.0,
                vy: 0.0,
                vz: 0.0,
                afx: 0.0,
                afy: 0.0,
                afz: 0.0,
                yaw: heading as f32,
                yaw_rate: 0.0,
                type_mask: PositionTargetTypemask::from_bits_truncate(POSITION_ONLY_MASK),
                target_system: target_sys,
                target_component: target_comp,
                coordinate_frame: MavFrame::MAV_FRAME_LOCAL_NED,
            })
        }
        Command::Stop => return None,
    };
    Some(msg)
}
