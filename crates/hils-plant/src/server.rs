//! Plant Server (§4.2 / C2): receive-update-reply loop over a blocking UDP
//! socket. Structured after `uwb_hub.rs`'s receive loop — warn and continue
//! on any per-packet error, never let a bad datagram take the process down —
//! adapted from `tokio::net::UdpSocket` to `std::net::UdpSocket` since this
//! side has no async runtime (§5).
//!
//! The socket's read timeout doubles as a shutdown poll interval: `recv_from`
//! would otherwise block indefinitely between datagrams (§4.8, "the Plant
//! has no periodic scheduler"), which would leave a SIGINT/SIGTERM waiting
//! for the next peer datagram before `running` is ever checked again. This
//! mirrors `openentropy-cli`'s `while running.load(Ordering::SeqCst)` polling
//! loop, adapted from a fixed recording interval to a bounded socket timeout.

use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;
use tracing::{info, warn};

use hils_proto::{self, RequestPacket, ResponsePacket};

use crate::config::Config;
use crate::impairment::{Impairment, ImpairmentConfig};
use crate::physics::PhysicsState;
use crate::telemetry::{PlantTelemetryRow, TelemetryWriter};

const MAX_DATAGRAM: usize = 1024;

/// How often the receive loop wakes up with nothing to check the shutdown
/// flag, when no datagram has arrived.
pub const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(200);

fn wall_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Runs the receive-update-reply loop until `running` is cleared (by the
/// process's signal handler) or a fatal socket error occurs. On exit, the
/// current tick (if any) has already completed, and the telemetry writer is
/// flushed and closed before returning (§5: "the log file is flushed and
/// closed, the socket is closed" — the socket itself closes when the caller
/// drops it after `run` returns).
pub fn run(
    socket: &UdpSocket,
    config: &Config,
    mut physics: PhysicsState,
    mut telemetry: TelemetryWriter,
    mut rng: impl Rng,
    running: Arc<AtomicBool>,
) {
    let mut impairment = Impairment::new(ImpairmentConfig {
        enabled: config.enable_delay,
        base_delay_ms: config.base_delay_ms,
        network_delay_ms: config.network_delay_ms,
        jitter_ms: config.jitter_ms,
        jitter_kind: config.jitter_kind,
    });

    let mut buf = [0u8; MAX_DATAGRAM];
    while running.load(Ordering::SeqCst) {
        let (len, src) = match socket.recv_from(&mut buf) {
            Ok(pair) => pair,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                continue;
            }
            Err(e) => {
                warn!("plant: recv error: {e}");
                continue;
            }
        };
        let recv_wall = wall_now();

        let request: RequestPacket = match hils_proto::unpack_request(&buf[..len]) {
            Ok(r) => r,
            Err(_) => {
                warn!("plant: discarding invalid datagram from {src} ({len} bytes)");
                continue;
            }
        };

        if request.seq == 0 {
            physics.reset(config.initial_position, config.initial_velocity);
        }

        physics.step(request.fz as f64, config.step_dt);
        let sample = physics.sample(&mut rng);

        if impairment.enabled() {
            let delay = impairment.sample_delay(&mut rng);
            if delay > Duration::ZERO {
                std::thread::sleep(delay);
            }
        }

        let send_wall = wall_now();
        let response = ResponsePacket {
            seq: request.seq,
            timestamp: send_wall,
            pos_x: 0.0,
            pos_y: 0.0,
            pos_z: sample.position as f32,
            vel_x: 0.0,
            vel_y: 0.0,
            vel_z: sample.velocity as f32,
            acc_x: 0.0,
            acc_y: 0.0,
            acc_z: sample.acceleration as f32,
        };
        let bytes = hils_proto::pack_response(response);

        if let Err(e) = socket.send_to(&bytes, src) {
            warn!("plant: send to {src} failed: {e}");
        }

        let row = PlantTelemetryRow {
            seq: request.seq,
            recv_wall,
            send_wall,
            rtt_ms: (send_wall - recv_wall) * 1000.0,
            fx: request.fx,
            fy: request.fy,
            fz: request.fz,
            altitude: sample.position,
            velocity: sample.velocity,
            acceleration: sample.acceleration,
            client_addr: src.to_string(),
            packet_size: len,
        };
        if let Err(e) = telemetry.write_row(&row) {
            warn!("plant: telemetry write failed: {e}");
        }
    }

    info!("plant: shutdown signal received, closing telemetry log");
    if let Err(e) = telemetry.close() {
        warn!("plant: telemetry close failed: {e}");
    }
}
