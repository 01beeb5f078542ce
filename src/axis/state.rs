use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    #[default]
    Idle,
    /// Trigger seen, waiting for it to be released.
    Armed,
    Moving,
    /// Take-up only: holding position until the paper goes slack.
    WaitingForSlack,
    /// Ticked mode: pulling in slack until the idler reports tension.
    WaitingForTension,
}

impl MotionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, MotionState::Idle)
    }
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MotionState::Idle => "idle",
            MotionState::Armed => "armed",
            MotionState::Moving => "moving",
            MotionState::WaitingForSlack => "waiting_for_slack",
            MotionState::WaitingForTension => "waiting_for_tension",
        };
        f.write_str(name)
    }
}
