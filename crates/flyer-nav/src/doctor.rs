use anyhow::Result;
use crate::context::MissionParams;

pub fn check_mission(params: &MissionParams) -> Result<()> {
    let h = params.target_height;
    anyhow::ensure!(h.is_finite() && h > 0.0, "mission.target_height must be positive");
    // touchdown is detected below floor(h / 2); under 2 m that band is empty
    anyhow::ensure!(h >= 2.0, "mission.target_height below 2 m never detects touchdown");
    anyhow::ensure!(
        params.target_side.is_finite() && params.target_side > 0.0,
        "mission.target_side must be positive"
    );
    Ok(())
}
