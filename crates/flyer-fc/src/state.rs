use std::time::{Duration, Instant};

use flyer_proto::telemetry::TelemetrySnapshot;

#[derive(Debug, Clone, Default)]
pub struct LinkStatus {
    pub endpoint: String,
    pub messages: u64,
    pub last_heartbeat: Option<Instant>,
    pub last_msg: Option<String>,
    pub armed: bool,
    pub guided: bool,
}

impl LinkStatus {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), ..Default::default() }
    }

    pub fn on_message(&mut self, name: &str) {
        self.messages += 1;
        self.last_msg = Some(name.to_string());
    }

    pub fn on_heartbeat(&mut self, snapshot: &TelemetrySnapshot) {
        self.last_heartbeat = Some(Instant::now());
        self.armed = snapshot.armed;
        self.guided = snapshot.guided;
    }

    pub fn hb_age(&self) -> Option<Duration> {
        self.last_heartbeat.map(|t| t.elapsed())
    }
}
