use std::net::UdpSocket;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{info, warn};

use hils_controller::config::Config;
use hils_controller::telemetry::TelemetryWriter;
use hils_controller::{client, logdir};

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hils_controller=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let peer = format!("{}:{}", config.plant_host, config.plant_port);
    info!("hils-controller starting, peer {peer}");

    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect(&peer)?;
    let budget_s = (1.0 / config.rate_hz).min(config.timeout_s);
    socket.set_read_timeout(Some(Duration::from_secs_f64(budget_s)))?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || {
        warn!("hils-controller: shutdown signal received");
        handler_flag.store(false, Ordering::SeqCst);
    })
    .expect("error installing signal handler");

    let log_dir = logdir::resolve(&config);
    std::fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("numeric_log.csv");
    let telemetry = TelemetryWriter::create(&log_path)?;
    info!("controller telemetry: {}", log_path.display());

    let summary = client::run(&socket, &config, telemetry, running)?;
    info!(
        "run complete: {} deadline misses, {} timeouts over {} ticks",
        summary.deadline_misses, summary.timeouts, config.max_steps
    );

    if summary.deadline_misses > 0 {
        warn!("controller missed {} deadlines during this run", summary.deadline_misses);
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("hils-controller: fatal: {e}");
            ExitCode::FAILURE
        }
    }
}
