use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Feed and take-up run as two interlocked machines.
    Continuous,
    /// One combined machine moving the paper in bounded increments.
    Ticked,
    /// The take-up axis repeats a fixed move until the limit switch trips.
    Repeat,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Continuous => f.write_str("continuous"),
            Mode::Ticked => f.write_str("ticked"),
            Mode::Repeat => f.write_str("repeat"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "continuous" => Ok(Mode::Continuous),
            "ticked" => Ok(Mode::Ticked),
            "repeat" => Ok(Mode::Repeat),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

pub struct CoordinatorConfig {
    /// Sleep between the end of one tick and the start of the next.
    pub tick_interval: Duration,
}
