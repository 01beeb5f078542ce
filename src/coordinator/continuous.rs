//! Feed and take-up as two interlocked machines.
//!
//! The feed machine runs first each tick and reports what it did through a
//! [`FeedEvent`]. The take-up machine latches the latest event, so its read
//! of the request always reflects the feed's decision from the same tick.

use serde::Serialize;

use super::{
    command::{AxisCommand, AxisId},
    Inputs,
};
use crate::{axis::state::MotionState, geometry::MotionProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEvent {
    /// The feed just started a move; the take-up may start pulling slack.
    TakeUpRequested,
    /// The feed is parked and no longer asks for take-up.
    FeedIdle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ContinuousState {
    pub feed: MotionState,
    pub take: MotionState,
    pub take_up_pending: bool,
}

pub fn advance(
    state: ContinuousState,
    inputs: &Inputs,
    profile: &MotionProfile,
    commands: &mut Vec<AxisCommand>,
) -> ContinuousState {
    let (feed, event) = step_feed(state.feed, inputs, profile, commands);

    let take_up_pending = match event {
        Some(FeedEvent::TakeUpRequested) => true,
        Some(FeedEvent::FeedIdle) => false,
        None => state.take_up_pending,
    };
    let take = step_take(state.take, take_up_pending, inputs, profile, commands);

    ContinuousState {
        feed,
        take,
        take_up_pending,
    }
}

fn step_feed(
    state: MotionState,
    inputs: &Inputs,
    profile: &MotionProfile,
    commands: &mut Vec<AxisCommand>,
) -> (MotionState, Option<FeedEvent>) {
    match state {
        MotionState::Idle => {
            commands.push(AxisCommand::halt(AxisId::Feed));
            let next = if inputs.trigger.is_pressed() {
                MotionState::Armed
            } else {
                MotionState::Idle
            };
            (next, Some(FeedEvent::FeedIdle))
        }
        MotionState::Armed => {
            if inputs.trigger.is_released() {
                commands.push(AxisCommand::move_axis(
                    AxisId::Feed,
                    profile.feed_move(profile.move_length),
                ));
                (MotionState::Moving, Some(FeedEvent::TakeUpRequested))
            } else {
                (MotionState::Armed, None)
            }
        }
        MotionState::Moving => {
            if inputs.feed_reached {
                commands.push(AxisCommand::halt(AxisId::Feed));
                (MotionState::Idle, None)
            } else {
                (MotionState::Moving, None)
            }
        }
        // Not used by the feed machine; treat as parked.
        MotionState::WaitingForSlack | MotionState::WaitingForTension => {
            (MotionState::Idle, None)
        }
    }
}

fn step_take(
    state: MotionState,
    take_up_pending: bool,
    inputs: &Inputs,
    profile: &MotionProfile,
    commands: &mut Vec<AxisCommand>,
) -> MotionState {
    match state {
        MotionState::Idle => {
            commands.push(AxisCommand::halt(AxisId::Take));
            if take_up_pending {
                MotionState::WaitingForSlack
            } else {
                MotionState::Idle
            }
        }
        MotionState::WaitingForSlack => {
            commands.push(AxisCommand::halt(AxisId::Take));
            if inputs.tension.is_slack() {
                commands.push(AxisCommand::move_axis(
                    AxisId::Take,
                    profile.take_move(profile.move_length),
                ));
                MotionState::Moving
            } else if !take_up_pending {
                MotionState::Idle
            } else {
                MotionState::WaitingForSlack
            }
        }
        MotionState::Moving => {
            if inputs.tension.is_taut() {
                commands.push(AxisCommand::halt(AxisId::Take));
                MotionState::WaitingForSlack
            } else {
                MotionState::Moving
            }
        }
        MotionState::Armed | MotionState::WaitingForTension => MotionState::Idle,
    }
}
