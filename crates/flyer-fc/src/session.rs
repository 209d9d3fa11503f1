use anyhow::{Context, Result};
use flyer_nav::TelemetryObserver;
use flyer_proto::telemetry::TelemetryEvent;
use mavlink::error::MessageReadError;
use mavlink::Message;
use std::io::ErrorKind;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::gate::TelemetryGate;
use crate::mav::FcLink;
use crate::navlog::{NavLog, SharedNavLog};
use crate::state::LinkStatus;

/// Connection lifecycle: opens the nav log, runs the blocking receive loop until
/// a stop is requested, then closes the log.
pub struct Session {
    link: FcLink,
    gate: TelemetryGate,
    log: SharedNavLog,
    status: LinkStatus,
    heartbeat_interval: Duration,
}

impl Session {
    pub fn new(link: FcLink, log: SharedNavLog, endpoint: &str, heartbeat_hz: f32) -> Self {
        let gate = TelemetryGate::new(link.target_sys());
        Self {
            link,
            gate,
            log,
            status: LinkStatus::new(endpoint),
            heartbeat_interval: Duration::from_secs_f32(1.0 / heartbeat_hz.max(0.2)),
        }
    }

    pub fn status(&self) -> &LinkStatus {
        &self.status
    }

    pub fn start<O: TelemetryObserver>(&mut self, observer: &mut O) -> Result<()> {
        info!("Creating log file");
        self.with_log(|log| log.start())?;

        info!("starting connection");
        let res = self.run(observer);

        info!("Closing log file");
        let closed = self.with_log(|log| log.stop());
        info!(
            "session ended: endpoint={} messages={} last_heartbeat_age={:?} armed={} guided={}",
            self.status.endpoint,
            self.status.messages,
            self.status.hb_age(),
            self.status.armed,
            self.status.guided,
        );
        match (res, closed) {
            (Ok(()), closed) => closed,
            (Err(e), Err(close_err)) => {
                warn!("closing nav log failed: {:#}", close_err);
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
        }
    }

    fn run<O: TelemetryObserver>(&mut self, observer: &mut O) -> Result<()> {
        let mut last_hb_send: Option<Instant> = None;

        while !self.link.stop_requested() {
            if last_hb_send.map_or(true, |t| t.elapsed() >= self.heartbeat_interval) {
                if let Err(e) = self.link.send_heartbeat() {
                    warn!("heartbeat send failed: {:#}", e);
                }
                last_hb_send = Some(Instant::now());
            }

            let (hdr, msg) = match self.link.recv() {
                Ok(frame) => frame,
                // read timeout: nothing arrived, go round and re-check the stop flag
                Err(MessageReadError::Io(e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    continue;
                }
                Err(MessageReadError::Io(e)) => {
                    return Err(e).context("mavlink connection lost");
                }
                Err(e) => {
                    debug!("skipping unreadable frame: {:?}", e);
                    continue;
                }
            };
            self.status.on_message(msg.message_name());

            let events = self.gate.ingest(&hdr, &msg);
            if events.is_empty() {
                continue;
            }
            let snapshot = *self.gate.snapshot();
            // the guard in FcLink must be open before the observer's first command
            if events.contains(&TelemetryEvent::VehicleStateUpdated) {
                self.link.mark_heartbeat();
                self.status.on_heartbeat(&snapshot);
            }
            self.with_log(|log| log.telemetry(msg.message_name(), &snapshot))?;
            for event in events {
                observer.on_event(event, &snapshot)?;
            }
        }
        Ok(())
    }

    fn with_log<T>(&self, f: impl FnOnce(&mut NavLog) -> Result<T>) -> Result<T> {
        let mut log = self.log.lock().map_err(|_| anyhow::anyhow!("nav log poisoned"))?;
        f(&mut *log)
    }
}
