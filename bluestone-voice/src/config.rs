//! bluestone-voice configuration
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (--config, --time-scale)
//! 2. Environment variable (BLUESTONE_CONFIG names the file)
//! 3. TOML configuration file (`<config_dir>/bluestone/voice.toml`)
//! 4. Built-in defaults (code constants)

use crate::error::Result;
use bluestone_common::config::{load_or_default, resolve_config_path, LoggingConfig, CONFIG_ENV_VAR};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default config file name inside the per-user config directory
pub const CONFIG_FILE_NAME: &str = "voice.toml";

/// Complete application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoiceConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Scheduler behaviour
    #[serde(default)]
    pub scheduler: SchedulerSettings,

    /// Simulated engine used by the demo binary
    #[serde(default)]
    pub simulator: SimulatorSettings,
}

/// Per-session scheduler settings
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// Send a now-playing notice when a bound track starts
    #[serde(default = "default_true")]
    pub announce_now_playing: bool,

    /// Defuse `@everyone` / `@here` in announced titles
    #[serde(default = "default_true")]
    pub scrub_mentions: bool,

    /// Capacity of each session's event broadcast channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            announce_now_playing: true,
            scrub_mentions: true,
            event_buffer: default_event_buffer(),
        }
    }
}

/// Simulated engine settings
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorSettings {
    /// Playback speed multiplier (2.0 plays tracks in half their length)
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,

    /// How long a `stuck:` track plays before the engine reports it stalled
    #[serde(default = "default_stuck_threshold_ms")]
    pub stuck_threshold_ms: u64,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            time_scale: default_time_scale(),
            stuck_threshold_ms: default_stuck_threshold_ms(),
        }
    }
}

impl SimulatorSettings {
    /// Wall-clock time a track of `length` takes at the configured speed
    pub fn scaled(&self, length: Duration) -> Duration {
        if self.time_scale > 0.0 && self.time_scale.is_finite() {
            length.div_f64(self.time_scale)
        } else {
            length
        }
    }

    pub fn stuck_threshold(&self) -> Duration {
        Duration::from_millis(self.stuck_threshold_ms)
    }
}

fn default_true() -> bool {
    true
}

fn default_event_buffer() -> usize {
    100
}

fn default_time_scale() -> f64 {
    1.0
}

fn default_stuck_threshold_ms() -> u64 {
    10_000
}

impl VoiceConfig {
    /// Resolve and load the configuration; missing files yield defaults.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let path = resolve_config_path(cli_path, CONFIG_ENV_VAR, CONFIG_FILE_NAME);
        let config: VoiceConfig = load_or_default(path.as_deref())?;
        Ok(config)
    }
}
