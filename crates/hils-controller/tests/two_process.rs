//! Exercises the Controller's tick loop against a real Plant loop running
//! in-process (same OS process, separate thread) over a genuine UDP socket
//! pair on localhost. This is the two-process scenario from §8 collapsed
//! into one test binary so it doesn't depend on spawning a second process.

use std::net::UdpSocket;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use rand::SeedableRng;

use hils_controller::client;
use hils_controller::config::Config as ControllerConfig;
use hils_controller::telemetry::TelemetryWriter as ControllerTelemetryWriter;

use hils_plant::config::{Config as PlantConfig, JitterKind};
use hils_plant::physics::PhysicsState;
use hils_plant::server as plant_server;
use hils_plant::telemetry::TelemetryWriter as PlantTelemetryWriter;

fn temp_csv(name: &str) -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("hils_test_{name}_{}.csv", std::process::id()));
    path
}

#[test]
fn controller_completes_run_against_inprocess_plant() {
    let plant_socket = UdpSocket::bind("127.0.0.1:0").expect("bind plant socket");
    let plant_addr = plant_socket.local_addr().unwrap();

    let plant_config = PlantConfig {
        bind_addr: plant_addr,
        step_dt: 0.01,
        mass: 1.0,
        gravity: 9.81,
        initial_position: 0.0,
        initial_velocity: 0.0,
        enable_delay: false,
        base_delay_ms: 0.0,
        network_delay_ms: 0.0,
        jitter_ms: 0.0,
        jitter_kind: JitterKind::Uniform,
        log_date_dir: None,
        log_description: "test".into(),
        seed: Some(7),
    };

    let plant_log = temp_csv("plant");
    let plant_telemetry = PlantTelemetryWriter::create(&plant_log).expect("plant telemetry");
    let physics = PhysicsState::new(
        plant_config.mass,
        plant_config.gravity,
        plant_config.initial_position,
        plant_config.initial_velocity,
    );

    thread::spawn(move || {
        let rng = rand::rngs::StdRng::seed_from_u64(7);
        let plant_running = Arc::new(AtomicBool::new(true));
        plant_server::run(&plant_socket, &plant_config, physics, plant_telemetry, rng, plant_running);
    });

    // The Plant's recv_from is ready as soon as the socket is bound; this
    // just gives the spawned thread a moment to reach the loop.
    thread::sleep(Duration::from_millis(20));

    let controller_socket = UdpSocket::bind("0.0.0.0:0").expect("bind controller socket");
    controller_socket.connect(plant_addr).expect("connect to plant");
    controller_socket.set_read_timeout(Some(Duration::from_millis(500))).unwrap();

    let controller_config = ControllerConfig {
        plant_host: plant_addr.ip().to_string(),
        plant_port: plant_addr.port(),
        timeout_s: 0.5,
        step_dt: 0.01,
        rate_hz: 200.0,
        max_steps: 50,
        kp: 10.0,
        ki: 0.5,
        kd: 2.0,
        setpoint: 10.0,
        integral_limit: 300.0,
        mass: 1.0,
        gravity: 9.81,
        log_date_dir: None,
        log_description: "test".into(),
    };

    let controller_log = temp_csv("controller");
    let controller_telemetry =
        ControllerTelemetryWriter::create(&controller_log).expect("controller telemetry");

    let running = Arc::new(AtomicBool::new(true));
    let summary = client::run(&controller_socket, &controller_config, controller_telemetry, running)
        .expect("controller run should complete without a fatal error");

    assert_eq!(summary.timeouts, 0, "a healthy in-process Plant should never time out");

    let _ = std::fs::remove_file(&plant_log);
    let _ = std::fs::remove_file(&controller_log);
}

#[test]
fn plant_echoes_seq_and_controller_times_out_when_offline() {
    // Scenario 5: no Plant listening at all — every tick should time out
    // with rtt_ms = 0, and the run should still complete cleanly.
    let controller_socket = UdpSocket::bind("0.0.0.0:0").expect("bind controller socket");
    // A bound-but-unconnected local port that nothing is listening on.
    let decoy = UdpSocket::bind("127.0.0.1:0").unwrap();
    let decoy_addr = decoy.local_addr().unwrap();
    drop(decoy);
    controller_socket.connect(decoy_addr).expect("connect to nobody");
    controller_socket.set_read_timeout(Some(Duration::from_millis(50))).unwrap();

    let controller_config = ControllerConfig {
        plant_host: decoy_addr.ip().to_string(),
        plant_port: decoy_addr.port(),
        timeout_s: 0.05,
        step_dt: 0.01,
        rate_hz: 200.0,
        max_steps: 5,
        kp: 10.0,
        ki: 0.0,
        kd: 0.0,
        setpoint: 10.0,
        integral_limit: 300.0,
        mass: 1.0,
        gravity: 9.81,
        log_date_dir: None,
        log_description: "test".into(),
    };

    let controller_log = temp_csv("offline_controller");
    let controller_telemetry =
        ControllerTelemetryWriter::create(&controller_log).expect("controller telemetry");

    let running = Arc::new(AtomicBool::new(true));
    let summary = client::run(&controller_socket, &controller_config, controller_telemetry, running)
        .expect("controller run should complete even with no Plant");

    assert_eq!(summary.timeouts, 5);

    let _ = std::fs::remove_file(&controller_log);
}

#[test]
fn controller_abandons_remaining_ticks_on_shutdown_signal() {
    // §5: "the current tick completes or is abandoned" — a cleared
    // `running` flag must stop the loop well short of `max_steps`.
    let controller_socket = UdpSocket::bind("0.0.0.0:0").expect("bind controller socket");
    let decoy = UdpSocket::bind("127.0.0.1:0").unwrap();
    let decoy_addr = decoy.local_addr().unwrap();
    drop(decoy);
    controller_socket.connect(decoy_addr).expect("connect to nobody");
    controller_socket.set_read_timeout(Some(Duration::from_millis(20))).unwrap();

    let controller_config = ControllerConfig {
        plant_host: decoy_addr.ip().to_string(),
        plant_port: decoy_addr.port(),
        timeout_s: 0.02,
        step_dt: 0.01,
        rate_hz: 50.0,
        max_steps: 10_000,
        kp: 10.0,
        ki: 0.0,
        kd: 0.0,
        setpoint: 10.0,
        integral_limit: 300.0,
        mass: 1.0,
        gravity: 9.81,
        log_date_dir: None,
        log_description: "test".into(),
    };

    let controller_log = temp_csv("shutdown_controller");
    let controller_telemetry =
        ControllerTelemetryWriter::create(&controller_log).expect("controller telemetry");

    let running = Arc::new(AtomicBool::new(true));
    let signal_flag = running.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        signal_flag.store(false, Ordering::SeqCst);
    });

    let summary = client::run(&controller_socket, &controller_config, controller_telemetry, running)
        .expect("controller run should return cleanly once shutdown is signaled");

    assert!(
        summary.timeouts < controller_config.max_steps,
        "controller should abandon remaining ticks instead of running to completion"
    );

    let _ = std::fs::remove_file(&controller_log);
}

#[test]
fn plant_server_exits_promptly_on_shutdown_signal() {
    // §5: the Plant's receive loop has no periodic scheduler, so its
    // shutdown responsiveness is bounded by `SHUTDOWN_POLL_INTERVAL`.
    use hils_plant::server::SHUTDOWN_POLL_INTERVAL;

    let plant_socket = UdpSocket::bind("127.0.0.1:0").expect("bind plant socket");
    plant_socket.set_read_timeout(Some(SHUTDOWN_POLL_INTERVAL)).unwrap();

    let plant_config = PlantConfig {
        bind_addr: plant_socket.local_addr().unwrap(),
        step_dt: 0.01,
        mass: 1.0,
        gravity: 9.81,
        initial_position: 0.0,
        initial_velocity: 0.0,
        enable_delay: false,
        base_delay_ms: 0.0,
        network_delay_ms: 0.0,
        jitter_ms: 0.0,
        jitter_kind: JitterKind::Uniform,
        log_date_dir: None,
        log_description: "test".into(),
        seed: Some(1),
    };

    let plant_log = temp_csv("shutdown_plant");
    let plant_telemetry = PlantTelemetryWriter::create(&plant_log).expect("plant telemetry");
    let physics = PhysicsState::new(
        plant_config.mass,
        plant_config.gravity,
        plant_config.initial_position,
        plant_config.initial_velocity,
    );

    let running = Arc::new(AtomicBool::new(true));
    let signal_flag = running.clone();

    let start = Instant::now();
    let handle = thread::spawn(move || {
        let rng = rand::rngs::StdRng::seed_from_u64(1);
        plant_server::run(&plant_socket, &plant_config, physics, plant_telemetry, rng, running);
    });

    thread::sleep(Duration::from_millis(10));
    signal_flag.store(false, Ordering::SeqCst);
    handle.join().expect("plant server thread should not panic");

    assert!(
        start.elapsed() < SHUTDOWN_POLL_INTERVAL * 3,
        "plant server should exit within a small multiple of its poll interval"
    );

    let _ = std::fs::remove_file(&plant_log);
}
