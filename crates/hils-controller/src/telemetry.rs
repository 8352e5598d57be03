//! Controller-side telemetry logger (§4.7 / C7). Column order matches
//! §4.7's Controller row exactly.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ControllerTelemetryRow {
    pub seq: u32,
    pub sim_time: f64,
    pub send_wall: f64,
    pub recv_wall: f64,
    pub rtt_ms: f64,
    pub fx: f32,
    pub fy: f32,
    pub fz: f32,
    pub altitude: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub altitude_error: f64,
    pub setpoint: f64,
    pub timeout: bool,
}

pub struct TelemetryWriter {
    writer: csv::Writer<File>,
}

impl TelemetryWriter {
    pub fn create(path: &Path) -> Result<Self, csv::Error> {
        let writer = csv::Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn write_row(&mut self, row: &ControllerTelemetryRow) -> Result<(), csv::Error> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn close(mut self) -> Result<(), csv::Error> {
        self.writer.flush()?;
        Ok(())
    }
}
