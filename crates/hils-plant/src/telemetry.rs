//! Plant-side telemetry logger (§4.7 / C7).
//!
//! One CSV row per tick, flushed immediately, so a killed run still leaves a
//! parseable partial log. Column order matches §4.7's Plant row exactly.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PlantTelemetryRow {
    pub seq: u32,
    pub recv_wall: f64,
    pub send_wall: f64,
    /// Plant-local RTT proxy: send_wall - recv_wall.
    pub rtt_ms: f64,
    pub fx: f32,
    pub fy: f32,
    pub fz: f32,
    pub altitude: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub client_addr: String,
    pub packet_size: usize,
}

pub struct TelemetryWriter {
    writer: csv::Writer<File>,
}

impl TelemetryWriter {
    pub fn create(path: &Path) -> Result<Self, csv::Error> {
        let writer = csv::Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn write_row(&mut self, row: &PlantTelemetryRow) -> Result<(), csv::Error> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn close(mut self) -> Result<(), csv::Error> {
        self.writer.flush()?;
        Ok(())
    }
}
