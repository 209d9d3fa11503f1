pub mod doctor;
pub mod gate;
pub mod mav;
pub mod navlog;
pub mod session;
pub mod state;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// MAVLink ids we use (ground side)
    pub sys_id: u8,
    pub comp_id: u8,

    /// target system/component (vehicle side). 1/1 is common for ArduPilot.
    pub target_sys: u8,
    pub target_comp: u8,

    /// Companion heartbeat send rate.
    pub send_heartbeat_hz: f32,

    /// Refuse to send commands before the vehicle's first heartbeat.
    pub require_heartbeat: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            sys_id: 255,
            comp_id: 0,
            target_sys: 1,
            target_comp: 1,
            send_heartbeat_hz: 1.0,
            require_heartbeat: true,
        }
    }
}

/// Connection string understood by `mavlink::connect`.
pub fn tcp_endpoint(host: &str, port: u16) -> String {
    format!("tcpout:{}:{}", host, port)
}
