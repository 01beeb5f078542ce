//! One combined machine that moves the paper in bounded increments so the
//! idler arm never has to absorb more than `move_step` inches of slack.

use serde::Serialize;

use super::{
    command::{AxisCommand, AxisId},
    Inputs,
};
use crate::{axis::state::MotionState, geometry::MotionProfile};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TickedState {
    pub phase: MotionState,
    /// Inches still to move in the current cycle.
    pub move_left: f64,
    /// Length of the increment in flight.
    pub chunk: f64,
}

impl TickedState {
    pub fn feed_state(&self) -> MotionState {
        match self.phase {
            MotionState::Armed | MotionState::Moving => self.phase,
            _ => MotionState::Idle,
        }
    }

    pub fn take_state(&self) -> MotionState {
        match self.phase {
            MotionState::WaitingForTension => MotionState::Moving,
            _ => MotionState::Idle,
        }
    }
}

/// Remaining travel below this many inches counts as done.
pub const REMAINDER_TOLERANCE: f64 = 1e-9;

/// Split off the next increment: a full `move_step` while more than that
/// remains, otherwise whatever is left.
pub fn next_chunk(move_left: f64, move_step: f64) -> (f64, f64) {
    let rest = move_left - move_step;
    if rest > REMAINDER_TOLERANCE {
        (move_step, rest)
    } else {
        (move_left, 0.0)
    }
}

pub fn advance(
    state: TickedState,
    inputs: &Inputs,
    profile: &MotionProfile,
    commands: &mut Vec<AxisCommand>,
) -> TickedState {
    match state.phase {
        MotionState::Idle => {
            commands.push(AxisCommand::halt(AxisId::Feed));
            commands.push(AxisCommand::halt(AxisId::Take));
            if inputs.trigger.is_pressed() {
                TickedState {
                    phase: MotionState::Armed,
                    move_left: profile.move_length,
                    chunk: 0.0,
                }
            } else {
                state
            }
        }
        MotionState::Armed => {
            if inputs.trigger.is_released() {
                let (chunk, move_left) = next_chunk(state.move_left, profile.move_step);
                commands.push(AxisCommand::move_axis(
                    AxisId::Feed,
                    profile.feed_move(chunk),
                ));
                TickedState {
                    phase: MotionState::Moving,
                    move_left,
                    chunk,
                }
            } else {
                state
            }
        }
        MotionState::Moving => {
            if inputs.feed_reached {
                commands.push(AxisCommand::halt(AxisId::Feed));
                commands.push(AxisCommand::move_axis(
                    AxisId::Take,
                    profile.take_move(state.chunk),
                ));
                TickedState {
                    phase: MotionState::WaitingForTension,
                    ..state
                }
            } else {
                state
            }
        }
        MotionState::WaitingForTension => {
            if inputs.tension.is_taut() {
                commands.push(AxisCommand::halt(AxisId::Take));
                let phase = if state.move_left > REMAINDER_TOLERANCE {
                    MotionState::Armed
                } else {
                    MotionState::Idle
                };
                TickedState {
                    phase,
                    move_left: state.move_left,
                    chunk: 0.0,
                }
            } else {
                state
            }
        }
        MotionState::WaitingForSlack => TickedState::default(),
    }
}
