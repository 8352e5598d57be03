//! Resolves the run's log directory (§6), same rule as the Plant side:
//! `LOG_DATE_DIR` verbatim if set, otherwise a generated
//! `logs/<YYYY-MM-DD>/<HHMMSS>_<LOG_DESCRIPTION>/` path.

use std::path::PathBuf;

use chrono::Local;

use crate::config::Config;

pub fn resolve(config: &Config) -> PathBuf {
    match &config.log_date_dir {
        Some(dir) => PathBuf::from(dir),
        None => {
            let now = Local::now();
            PathBuf::from("logs")
                .join(now.format("%Y-%m-%d").to_string())
                .join(format!("{}_{}", now.format("%H%M%S"), config.log_description))
        }
    }
}
