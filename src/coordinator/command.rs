use std::fmt;

use serde::{Deserialize, Serialize};

use crate::axis::movement_parameters::MoveParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisId {
    Feed,
    Take,
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisId::Feed => f.write_str("feed"),
            AxisId::Take => f.write_str("take"),
        }
    }
}

/// Side effect requested by a coordinator tick. The runner executes these
/// in order against the drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AxisCommand {
    Move { axis: AxisId, params: MoveParams },
    Halt { axis: AxisId },
}

impl AxisCommand {
    pub fn move_axis(axis: AxisId, params: MoveParams) -> Self {
        AxisCommand::Move { axis, params }
    }

    pub fn halt(axis: AxisId) -> Self {
        AxisCommand::Halt { axis }
    }

    pub fn axis(&self) -> AxisId {
        match self {
            AxisCommand::Move { axis, .. } | AxisCommand::Halt { axis } => *axis,
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, AxisCommand::Move { .. })
    }
}
