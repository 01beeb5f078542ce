//! Interpretation of the normalized digital input of each axis.
//!
//! Drivers report `check_flag() == true` when the input line reads clear.
//! The feed axis carries a momentary push button (clear = released) and the
//! take-up axis carries the idler arm limit switch (clear = taut).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Pressed,
    Released,
}

impl Trigger {
    pub fn from_flag(flag: bool) -> Self {
        if flag {
            Trigger::Released
        } else {
            Trigger::Pressed
        }
    }

    pub fn is_pressed(&self) -> bool {
        matches!(self, Trigger::Pressed)
    }

    pub fn is_released(&self) -> bool {
        !self.is_pressed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tension {
    Slack,
    Taut,
}

impl Tension {
    pub fn from_flag(flag: bool) -> Self {
        if flag {
            Tension::Taut
        } else {
            Tension::Slack
        }
    }

    pub fn is_slack(&self) -> bool {
        matches!(self, Tension::Slack)
    }

    pub fn is_taut(&self) -> bool {
        !self.is_slack()
    }
}
