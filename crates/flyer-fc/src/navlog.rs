//! Telemetry log written for the duration of a session.
//!
//! One JSON object per line, each stamped with seconds since the log was opened:
//! every vehicle telemetry message that reached the mission, and every command it issued.

use anyhow::{Context, Result};
use flyer_nav::VehicleCommander;
use flyer_proto::telemetry::{Command, TelemetrySnapshot};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Entry<'a> {
    Telemetry { message: &'a str, snapshot: &'a TelemetrySnapshot },
    Command { command: &'a Command },
}

#[derive(Debug, Serialize)]
struct Line<'a> {
    t: f64,
    #[serde(flatten)]
    entry: Entry<'a>,
}

#[derive(Debug)]
struct Open {
    out: BufWriter<File>,
    opened: OffsetDateTime,
}

#[derive(Debug)]
pub struct NavLog {
    path: PathBuf,
    open: Option<Open>,
}

impl NavLog {
    pub fn new(dir: impl AsRef<Path>, file: &str) -> Self {
        Self { path: dir.as_ref().join(file), open: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn start(&mut self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
        }
        let f = File::create(&self.path)
            .with_context(|| format!("create log {}", self.path.display()))?;
        self.open = Some(Open { out: BufWriter::new(f), opened: OffsetDateTime::now_utc() });
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        if let Some(mut open) = self.open.take() {
            open.out.flush().context("flush nav log")?;
        }
        Ok(())
    }

    /// One line per received message, with the snapshot after it was applied.
    pub fn telemetry(&mut self, message: &str, snapshot: &TelemetrySnapshot) -> Result<()> {
        self.write(Entry::Telemetry { message, snapshot })
    }

    pub fn command(&mut self, command: &Command) -> Result<()> {
        self.write(Entry::Command { command })
    }

    // Closed log swallows records.
    fn write(&mut self, entry: Entry<'_>) -> Result<()> {
        let Some(open) = self.open.as_mut() else { return Ok(()) };
        let t = (OffsetDateTime::now_utc() - open.opened).as_seconds_f64();
        serde_json::to_writer(&mut open.out, &Line { t, entry })?;
        open.out.write_all(b"\n")?;
        Ok(())
    }
}

pub type SharedNavLog = Arc<Mutex<NavLog>>;

/// Writes each command to the nav log before handing it on.
pub struct LoggingCommander<C> {
    inner: C,
    log: SharedNavLog,
}

impl<C> LoggingCommander<C> {
    pub fn new(inner: C, log: SharedNavLog) -> Self {
        Self { inner, log }
    }
}

impl<C: VehicleCommander> VehicleCommander for LoggingCommander<C> {
    fn execute(&mut self, cmd: &Command) -> Result<()> {
        self.log
            .lock()
            .map_err(|_| anyhow::anyhow!("nav log poisoned"))?
            .command(cmd)?;
        self.inner.execute(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("flyer-navlog-{}-{}", name, std::process::id()))
    }

    #[derive(Default)]
    struct Sink(Vec<Command>);

    impl VehicleCommander for Sink {
        fn execute(&mut self, cmd: &Command) -> Result<()> {
            self.0.push(*cmd);
            Ok(())
        }
    }

    #[test]
    fn writes_json_lines_between_start_and_stop() {
        let dir = scratch_dir("lines");
        let mut log = NavLog::new(&dir, "NavLog.txt");

        // nothing is written before start
        log.command(&Command::Arm).unwrap();
        log.start().unwrap();
        assert!(log.is_open());

        let snap = TelemetrySnapshot { position: [0.0, 0.0, -3.0], ..Default::default() };
        log.telemetry("LOCAL_POSITION_NED", &snap).unwrap();
        log.command(&Command::Land).unwrap();
        log.stop().unwrap();
        log.command(&Command::Disarm).unwrap();

        let text = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<serde_json::Value> =
            text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["kind"], "telemetry");
        assert_eq!(lines[0]["message"], "LOCAL_POSITION_NED");
        assert_eq!(lines[0]["snapshot"]["position"][2], -3.0);
        assert_eq!(lines[1]["kind"], "command");
        assert_eq!(lines[1]["command"], "Land");
        assert!(lines[1]["t"].as_f64().unwrap() >= 0.0);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn logging_commander_forwards() {
        let dir = scratch_dir("forward");
        let log = Arc::new(Mutex::new(NavLog::new(&dir, "NavLog.txt")));
        log.lock().unwrap().start().unwrap();

        let mut cmdr = LoggingCommander::new(Sink::default(), log.clone());
        cmdr.execute(&Command::TakeControl).unwrap();
        cmdr.execute(&Command::Takeoff { altitude: 3.0 }).unwrap();
        assert_eq!(cmdr.inner.0, vec![Command::TakeControl, Command::Takeoff { altitude: 3.0 }]);

        let path = {
            let mut log = log.lock().unwrap();
            log.stop().unwrap();
            log.path().to_path_buf()
        };
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("\"Takeoff\""));

        fs::remove_dir_all(&dir).ok();
    }
}
