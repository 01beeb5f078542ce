//! TOML configuration for the installation.
//!
//! Every section has defaults matching the gallery setup, so an empty file
//! (or no file at all) yields a runnable configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    axis::movement_parameters::MoveParams,
    coordinator::config::Mode,
    geometry::{MotionProfile, DEVICE_MAX_VELOCITY},
    socket_server::config::SocketServerConfig,
};

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "config I/O error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mode: Mode,
    pub tick_interval_ms: u64,
    pub feed: SpoolConfig,
    pub take: SpoolConfig,
    pub motion: MotionConfig,
    pub repeat: RepeatConfig,
    pub driver: DriverConfig,
    pub sim: SimConfig,
    pub control_socket: Option<SocketServerConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Continuous,
            tick_interval_ms: 100,
            feed: SpoolConfig {
                address: "10.0.1.70".to_string(),
                diameter: 47.0,
                direction: 1,
            },
            take: SpoolConfig {
                address: "10.0.1.71".to_string(),
                diameter: 3.0,
                direction: 1,
            },
            motion: MotionConfig::default(),
            repeat: RepeatConfig::default(),
            driver: DriverConfig::default(),
            sim: SimConfig::default(),
            control_socket: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpoolConfig {
    /// Host (and optional port) of the axis controller's REST interface.
    pub address: String,
    /// Estimated spool diameter in inches.
    pub diameter: f64,
    #[serde(default = "default_direction")]
    pub direction: i8,
}

fn default_direction() -> i8 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub ticks_per_rev: u32,
    /// Paper moved per button press, in inches.
    pub move_length: f64,
    /// Largest single move in ticked mode, bounded by idler arm travel.
    pub move_step: f64,
    /// Inches per minute.
    pub linear_velocity: f64,
    pub max_velocity: f64,
    pub take_overage: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            ticks_per_rev: 25_000,
            move_length: 12.0,
            move_step: 4.0,
            linear_velocity: 5.0,
            max_velocity: 250.0,
            take_overage: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepeatConfig {
    pub velocity: u32,
    pub steps: i64,
}

impl Default for RepeatConfig {
    fn default() -> Self {
        Self {
            velocity: 200,
            steps: 25_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub request_timeout_ms: u64,
    /// Pause after every register write; the controller drops writes that
    /// arrive back to back.
    pub write_settle_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 2_000,
            write_settle_ms: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Control loop ticks between simulated button presses.
    pub press_interval_ticks: u32,
    /// Motor ticks a simulated axis travels per status poll.
    pub ticks_per_poll: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            press_interval_ticks: 50,
            ticks_per_poll: 400,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be positive".to_string(),
            ));
        }

        for (name, spool) in [("feed", &self.feed), ("take", &self.take)] {
            if !(spool.diameter > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} diameter must be positive, got {}",
                    name, spool.diameter
                )));
            }
            if spool.direction != 1 && spool.direction != -1 {
                return Err(ConfigError::Invalid(format!(
                    "{} direction must be 1 or -1, got {}",
                    name, spool.direction
                )));
            }
        }

        let motion = &self.motion;
        if motion.ticks_per_rev == 0 {
            return Err(ConfigError::Invalid(
                "ticks_per_rev must be positive".to_string(),
            ));
        }
        positive("move_step", motion.move_step)?;
        positive("linear_velocity", motion.linear_velocity)?;
        positive("max_velocity", motion.max_velocity)?;
        positive("take_overage", motion.take_overage)?;
        if !motion.move_length.is_finite() || motion.move_length < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "move_length must be finite and not negative, got {}",
                motion.move_length
            )));
        }

        // Every increment is at most one full move, so checking move_length
        // covers all modes.
        let profile = MotionProfile::from_config(self);
        for (name, params) in [
            ("feed", profile.feed_move(motion.move_length)),
            ("take", profile.take_move(motion.move_length)),
        ] {
            if !params.steps_in_range() {
                return Err(ConfigError::Invalid(format!(
                    "move_length {} needs {} {} ticks, beyond the controller range",
                    motion.move_length, params.steps, name
                )));
            }
        }

        if f64::from(self.repeat.velocity) > DEVICE_MAX_VELOCITY {
            return Err(ConfigError::Invalid(format!(
                "repeat velocity must not exceed {}, got {}",
                DEVICE_MAX_VELOCITY, self.repeat.velocity
            )));
        }
        if !MoveParams::new(self.repeat.velocity, self.repeat.steps).steps_in_range() {
            return Err(ConfigError::Invalid(format!(
                "repeat steps beyond the controller range: {}",
                self.repeat.steps
            )));
        }

        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}
