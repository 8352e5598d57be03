use std::net::UdpSocket;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use tracing::{info, warn};

use hils_plant::config::Config;
use hils_plant::physics::PhysicsState;
use hils_plant::server::SHUTDOWN_POLL_INTERVAL;
use hils_plant::telemetry::TelemetryWriter;
use hils_plant::{logdir, server};

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hils_plant=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    info!("hils-plant starting, binding {}", config.bind_addr);

    let socket = UdpSocket::bind(config.bind_addr)?;
    // recv_from would otherwise block indefinitely between datagrams; this
    // timeout is purely a shutdown-flag poll interval, not a protocol timeout.
    socket.set_read_timeout(Some(SHUTDOWN_POLL_INTERVAL))?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || {
        warn!("hils-plant: shutdown signal received");
        handler_flag.store(false, Ordering::SeqCst);
    })
    .expect("error installing signal handler");

    let log_dir = logdir::resolve(&config);
    std::fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("plant_log.csv");
    let telemetry = TelemetryWriter::create(&log_path)?;
    info!("plant telemetry: {}", log_path.display());

    let physics = PhysicsState::new(
        config.mass,
        config.gravity,
        config.initial_position,
        config.initial_velocity,
    );

    match config.seed {
        Some(seed) => {
            let rng = rand::rngs::StdRng::seed_from_u64(seed);
            server::run(&socket, &config, physics, telemetry, rng, running);
        }
        None => {
            let rng = rand::thread_rng();
            server::run(&socket, &config, physics, telemetry, rng, running);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("hils-plant: fatal: {e}");
            ExitCode::FAILURE
        }
    }
}
