//! Single-axis bring-up mode: the take-up axis repeats a fixed relative move
//! for as long as its limit switch stays clear of the paper. The feed axis is
//! never read or commanded.

use serde::Serialize;

use super::{
    command::{AxisCommand, AxisId},
    Inputs,
};
use crate::axis::{movement_parameters::MoveParams, state::MotionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RepeatState {
    pub phase: MotionState,
    /// Set by an operator halt. The axis stays parked until the limit switch
    /// trips and clears again, or the operator resumes.
    pub held: bool,
}

pub fn advance(
    state: RepeatState,
    inputs: &Inputs,
    params: MoveParams,
    commands: &mut Vec<AxisCommand>,
) -> RepeatState {
    if state.held {
        commands.push(AxisCommand::halt(AxisId::Take));
        return if inputs.tension.is_taut() {
            RepeatState {
                phase: MotionState::WaitingForSlack,
                held: false,
            }
        } else {
            state
        };
    }

    if inputs.tension.is_taut() {
        commands.push(AxisCommand::halt(AxisId::Take));
        return RepeatState {
            phase: MotionState::WaitingForSlack,
            held: false,
        };
    }

    let restart = match state.phase {
        MotionState::Moving => inputs.take_reached,
        _ => true,
    };
    if restart {
        commands.push(AxisCommand::move_axis(AxisId::Take, params));
    }

    RepeatState {
        phase: MotionState::Moving,
        held: false,
    }
}
