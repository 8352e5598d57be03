//! Startup configuration, loaded once from the environment (§4.9 / C9).
//!
//! Mirrors the `XxxConfig::default()` pattern this codebase already uses for
//! its UDP server: every field is read with
//! `env::var(..).ok().and_then(|v| v.parse().ok()).unwrap_or(default)`, and an
//! env var present but unparsable is a fatal `ConfigError`, not a silent
//! fallback.

use std::env;
use std::fmt;
use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {name} has an invalid value {value:?}: {source}")]
    Invalid {
        name: &'static str,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to resolve bind address: {0}")]
    Addr(#[from] std::net::AddrParseError),
}

fn parse_env<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value,
            source: Box::new(e),
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JitterKind {
    Uniform,
    Gaussian,
    Exponential,
}

impl fmt::Display for JitterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JitterKind::Uniform => "uniform",
            JitterKind::Gaussian => "gaussian",
            JitterKind::Exponential => "exponential",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for JitterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(JitterKind::Uniform),
            "gaussian" => Ok(JitterKind::Gaussian),
            "exponential" => Ok(JitterKind::Exponential),
            other => Err(format!("unknown jitter_kind {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub step_dt: f64,

    pub mass: f64,
    pub gravity: f64,
    pub initial_position: f64,
    pub initial_velocity: f64,

    pub enable_delay: bool,
    pub base_delay_ms: f64,
    pub network_delay_ms: f64,
    pub jitter_ms: f64,
    pub jitter_kind: JitterKind,

    pub log_date_dir: Option<String>,
    pub log_description: String,

    pub seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host: String = match env::var("PLANT_HOST") {
            Err(_) => "0.0.0.0".to_string(),
            Ok(v) => v,
        };
        let port: u16 = parse_env("PLANT_PORT", 5005)?;
        let bind_addr = format!("{host}:{port}")
            .parse()
            .map_err(ConfigError::Addr)?;

        let jitter_kind_raw: String = match env::var("jitter_kind") {
            Err(_) => "uniform".to_string(),
            Ok(v) => v,
        };
        let jitter_kind = jitter_kind_raw
            .parse::<JitterKind>()
            .map_err(|e| ConfigError::Invalid {
                name: "jitter_kind",
                value: jitter_kind_raw,
                source: e.into(),
            })?;

        let seed: Option<u64> = match env::var("PLANT_SEED") {
            Err(_) => None,
            Ok(v) => Some(v.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid { name: "PLANT_SEED", value: v, source: Box::new(e) }
            })?),
        };

        Ok(Config {
            bind_addr,
            step_dt: parse_env("STEP_DT", 0.01)?,
            mass: parse_env("mass", 1.0)?,
            gravity: parse_env("gravity", 9.81)?,
            initial_position: parse_env("initial_position", 0.0)?,
            initial_velocity: parse_env("initial_velocity", 0.0)?,
            enable_delay: parse_env("enable_delay", false)?,
            base_delay_ms: parse_env("base_delay_ms", 0.0)?,
            network_delay_ms: parse_env("network_delay_ms", 0.0)?,
            jitter_ms: parse_env("jitter_ms", 0.0)?,
            jitter_kind,
            log_date_dir: env::var("LOG_DATE_DIR").ok(),
            log_description: env::var("LOG_DESCRIPTION").unwrap_or_else(|_| "run".to_string()),
            seed,
        })
    }
}
