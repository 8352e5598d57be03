//! Startup configuration (§4.9 / C9), same env-var-with-typed-default
//! pattern as the Plant side and as this codebase's `UwbHubConfig::default()`.

use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {name} has an invalid value {value:?}: {source}")]
    Invalid {
        name: &'static str,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
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

#[derive(Debug, Clone)]
pub struct Config {
    pub plant_host: String,
    pub plant_port: u16,
    pub timeout_s: f64,
    pub step_dt: f64,
    pub rate_hz: f64,
    pub max_steps: u64,

    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub setpoint: f64,
    pub integral_limit: f64,

    pub mass: f64,
    pub gravity: f64,

    pub log_date_dir: Option<String>,
    pub log_description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            plant_host: env::var("PLANT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            plant_port: parse_env("PLANT_PORT", 5005)?,
            timeout_s: parse_env("TIMEOUT_S", 1.0)?,
            step_dt: parse_env("STEP_DT", 0.01)?,
            rate_hz: parse_env("RATE_HZ", 100.0)?,
            max_steps: parse_env("MAX_STEPS", 1000)?,
            kp: parse_env("kp", 10.0)?,
            ki: parse_env("ki", 0.5)?,
            kd: parse_env("kd", 2.0)?,
            setpoint: parse_env("setpoint", 10.0)?,
            integral_limit: parse_env("integral_limit", 300.0)?,
            mass: parse_env("mass", 1.0)?,
            gravity: parse_env("gravity", 9.81)?,
            log_date_dir: env::var("LOG_DATE_DIR").ok(),
            log_description: env::var("LOG_DESCRIPTION").unwrap_or_else(|_| "run".to_string()),
        })
    }
}
