use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use flyer_fc::mav::FcLink;
use flyer_fc::navlog::{LoggingCommander, NavLog};
use flyer_fc::session::Session;
use flyer_fc::{doctor as fc_doctor, tcp_endpoint, LinkConfig};
use flyer_nav::{doctor as nav_doctor, Mission, MissionParams};

use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "flyer", version, about = "Backyard Flyer - autonomous box patrol over MAVLink")]
struct Cli {
    /// Port number
    #[arg(long, default_value_t = 5760)]
    port: u16,

    /// host address, i.e. '127.0.0.1'
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

/// Optional settings file, named by `FLYER_CONFIG`. Every section falls back to defaults.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct Config {
    mission: MissionParams,
    link: LinkConfig,
    log: LogCfg,
}

#[derive(Debug, serde::Deserialize)]
#[serde(default)]
struct LogCfg {
    dir: String,
    file: String,
}

impl Default for LogCfg {
    fn default() -> Self {
        Self { dir: "Logs".into(), file: "NavLog.txt".into() }
    }
}

fn load_config() -> Result<Config> {
    let Ok(path) = std::env::var("FLYER_CONFIG") else {
        return Ok(Config::default());
    };
    let s = std::fs::read_to_string(&path).with_context(|| format!("read config {}", path))?;
    toml::from_str(&s).context("parse config toml")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = load_config()?;

    nav_doctor::check_mission(&cfg.mission)?;
    fc_doctor::check_link(&cfg.link)?;

    let endpoint = tcp_endpoint(&cli.host, cli.port);
    let link = FcLink::connect(&endpoint, &cfg.link).context("FC open")?;

    let log = Arc::new(Mutex::new(NavLog::new(&cfg.log.dir, &cfg.log.file)));
    let mut mission = Mission::new(cfg.mission, LoggingCommander::new(link.clone(), log.clone()));
    let mut session = Session::new(link.clone(), log, &endpoint, cfg.link.send_heartbeat_hz);

    // give the autopilot a moment to start streaming
    tokio::time::sleep(Duration::from_secs(2)).await;

    let stopper = link.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt: stopping after the next message");
            stopper.request_stop();
        }
    });

    // Receive loop in a blocking task (mavlink recv blocks).
    let finished = tokio::task::spawn_blocking(move || {
        session.start(&mut mission).map(|()| mission.is_finished())
    })
    .await
    .context("session task")??;

    if finished {
        info!("mission complete");
    } else {
        warn!("session stopped before the mission finished");
    }
    Ok(())
}
