//! Controller Client (§4.3 / C3): a fixed-count loop of `max_steps` ticks
//! over a connected, timeout-bounded UDP socket. Send errors are logged and
//! treated as a lost tick, never propagated out of the loop body, mirroring
//! `udp_tx.rs`'s "never crash the sim" send discipline adapted to a
//! synchronous request/reply pair instead of fire-and-forget.

use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use hils_proto::{self, RequestPacket};

use crate::config::Config;
use crate::pid::{self, PidState};
use crate::telemetry::{ControllerTelemetryRow, TelemetryWriter};
use crate::timing::TickScheduler;

/// Ephemeral per-tick record of the outstanding request. Never outlives one
/// tick (§3).
struct PendingRequest {
    seq: u32,
    send_time_monotonic: Instant,
    command: RequestPacket,
}

fn wall_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

pub struct RunSummary {
    pub deadline_misses: u64,
    pub timeouts: u64,
}

pub fn run(
    socket: &UdpSocket,
    config: &Config,
    mut telemetry: TelemetryWriter,
    running: Arc<AtomicBool>,
) -> anyhow::Result<RunSummary> {
    let mut pid = PidState::new(config.kp, config.ki, config.kd, config.setpoint, config.integral_limit);
    let mut scheduler = TickScheduler::new(config.rate_hz);

    let mut last_altitude = 0.0f64;
    let mut last_velocity = 0.0f64;
    let mut last_acceleration = 0.0f64;
    let mut timeouts = 0u64;

    for seq in 0..config.max_steps {
        if !running.load(Ordering::SeqCst) {
            info!("controller: shutdown signal received, abandoning remaining ticks");
            break;
        }

        let seq = seq as u32;
        let tick_start = Instant::now();

        // Mirrors the Plant's `reset_on_seq_zero`: seq 0 marks the start of
        // a run, so the PID's accumulated integral and derivative history
        // are cleared before producing that tick's command.
        if seq == 0 {
            pid.reset();
        }

        let output = pid.step(last_altitude, config.step_dt);
        let thrust = pid::command_thrust(output, config.mass, config.gravity);

        let command = RequestPacket { seq, timestamp: wall_now(), fx: 0.0, fy: 0.0, fz: thrust as f32 };
        let pending = PendingRequest { seq, send_time_monotonic: tick_start, command };

        let bytes = hils_proto::pack_request(pending.command);
        if let Err(e) = socket.send(&bytes) {
            warn!("controller: send failed on tick {seq}: {e}");
            timeouts += 1;
            let row = ControllerTelemetryRow {
                seq,
                sim_time: seq as f64 * config.step_dt,
                send_wall: pending.command.timestamp,
                recv_wall: 0.0,
                rtt_ms: 0.0,
                fx: 0.0,
                fy: 0.0,
                fz: thrust as f32,
                altitude: last_altitude,
                velocity: last_velocity,
                acceleration: last_acceleration,
                altitude_error: config.setpoint - last_altitude,
                setpoint: config.setpoint,
                timeout: true,
            };
            if let Err(e) = telemetry.write_row(&row) {
                warn!("controller: telemetry write failed: {e}");
            }
            scheduler.sleep_until_next(tick_start);
            continue;
        }

        let mut buf = [0u8; 1024];
        let (timeout, recv_wall, rtt_ms) = match socket.recv(&mut buf) {
            Ok(len) => {
                let recv_wall = wall_now();
                match hils_proto::unpack_response(&buf[..len]) {
                    Ok(response) if response.seq == pending.seq => {
                        let rtt_ms = pending.send_time_monotonic.elapsed().as_secs_f64() * 1000.0;
                        last_altitude = response.pos_z as f64;
                        last_velocity = response.vel_z as f64;
                        last_acceleration = response.acc_z as f64;
                        (false, recv_wall, rtt_ms)
                    }
                    Ok(response) => {
                        debug!(
                            "controller: stale reply seq={} for pending seq={}",
                            response.seq, pending.seq
                        );
                        (true, recv_wall, 0.0)
                    }
                    Err(_) => {
                        warn!("controller: discarding corrupt response on tick {seq}");
                        (true, recv_wall, 0.0)
                    }
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                (true, 0.0, 0.0)
            }
            Err(e) => {
                warn!("controller: recv error on tick {seq}: {e}");
                (true, 0.0, 0.0)
            }
        };

        if timeout {
            timeouts += 1;
        }

        let row = ControllerTelemetryRow {
            seq,
            sim_time: seq as f64 * config.step_dt,
            send_wall: pending.command.timestamp,
            recv_wall,
            rtt_ms,
            fx: pending.command.fx,
            fy: pending.command.fy,
            fz: pending.command.fz,
            altitude: last_altitude,
            velocity: last_velocity,
            acceleration: last_acceleration,
            altitude_error: config.setpoint - last_altitude,
            setpoint: config.setpoint,
            timeout,
        };
        if let Err(e) = telemetry.write_row(&row) {
            warn!("controller: telemetry write failed: {e}");
        }

        scheduler.sleep_until_next(tick_start);
    }

    telemetry.close()?;
    Ok(RunSummary { deadline_misses: scheduler.deadline_misses(), timeouts })
}
