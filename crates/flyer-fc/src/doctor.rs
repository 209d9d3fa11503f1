use anyhow::Result;
use crate::LinkConfig;

pub fn check_link(cfg: &LinkConfig) -> Result<()> {
    anyhow::ensure!(
        cfg.send_heartbeat_hz.is_finite() && cfg.send_heartbeat_hz > 0.0,
        "link.send_heartbeat_hz must be positive"
    );
    anyhow::ensure!(cfg.sys_id != cfg.target_sys, "link.sys_id collides with link.target_sys");
    anyhow::ensure!(cfg.target_sys != 0, "link.target_sys 0 is the broadcast id");
    Ok(())
}
