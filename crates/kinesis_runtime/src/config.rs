//! Runtime configuration
//!
//! Tuning for the sensor link and the session loop.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `KINESIS_REFRESH_SECS`, `KINESIS_TICKS`
//! 2. Config file: `kinesis.toml` (or the path in `KINESIS_CONFIG`)
//! 3. Defaults
//!
//! # Example Config File
//!
//! ```toml
//! [sensor]
//! status_refresh_secs = 1.0
//! backoff_factor = 1.5
//! max_refresh_secs = 10.0
//!
//! [session]
//! tick_rate = 30.0
//! ticks = 300
//! log_stats = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sensor link tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Seconds between availability polls while the device is absent
    pub status_refresh_secs: f32,
    /// Multiplier applied to the poll interval after each absent poll
    pub backoff_factor: f32,
    /// Upper bound on the poll interval, seconds
    pub max_refresh_secs: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            status_refresh_secs: 1.0,
            backoff_factor: 1.5,
            max_refresh_secs: 10.0,
        }
    }
}

/// Session loop tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Host update rate in Hz
    pub tick_rate: f32,
    /// Ticks to run in the demo session
    pub ticks: u32,
    /// Log a status report when the session ends
    pub log_stats: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30.0,
            ticks: 300,
            log_stats: true,
        }
    }
}

/// Full runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Sensor link tuning
    pub sensor: SensorConfig,
    /// Session loop tuning
    pub session: SessionConfig,
}

impl RuntimeConfig {
    /// Load configuration; never fails, falling back to defaults
    pub fn load() -> Self {
        let path = std::env::var("KINESIS_CONFIG").unwrap_or_else(|_| "kinesis.toml".to_string());
        let mut config = Self::load_file(Path::new(&path)).unwrap_or_default();
        config.apply_env();
        config
    }

    fn load_file(path: &Path) -> Option<Self> {
        let text = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&text) {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                Some(config)
            }
            Err(e) => {
                log::warn!("ignoring malformed config {}: {}", path.display(), e);
                None
            }
        }
    }

    fn apply_env(&mut self) {
        if let Some(secs) = env_parse::<f32>("KINESIS_REFRESH_SECS") {
            self.sensor.status_refresh_secs = secs;
        }
        if let Some(ticks) = env_parse::<u32>("KINESIS_TICKS") {
            self.session.ticks = ticks;
        }
    }

    /// Print a summary of the effective configuration
    pub fn print_summary(&self) {
        log::info!(
            "config: refresh {:.1}s (backoff x{:.1} to {:.1}s), {} ticks at {} Hz",
            self.sensor.status_refresh_secs,
            self.sensor.backoff_factor,
            self.sensor.max_refresh_secs,
            self.session.ticks,
            self.session.tick_rate,
        );
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = std::env::var(key).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log::warn!("ignoring unparsable {}={}", key, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.sensor.status_refresh_secs, 1.0);
        assert_eq!(config.session.tick_rate, 30.0);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: RuntimeConfig = toml::from_str(
            r#"
            [sensor]
            status_refresh_secs = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.sensor.status_refresh_secs, 0.5);
        assert_eq!(config.sensor.backoff_factor, 1.5);
        assert_eq!(config.session.ticks, 300);
    }
}
