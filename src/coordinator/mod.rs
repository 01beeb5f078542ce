//! Tick-driven motion coordination for the feed and take-up axes.
//!
//! [`Coordinator::advance`] is a pure transition: it takes the previous
//! [`CoordinatorState`] and the signals polled this tick, and returns the next
//! state plus the [`AxisCommand`]s to execute. All I/O and timing live in the
//! runner.

pub mod command;
pub mod config;
pub mod continuous;
pub mod repeat;
pub mod ticked;

use std::fmt;

use command::{AxisCommand, AxisId};
use config::Mode;
use continuous::ContinuousState;
use repeat::RepeatState;
use serde::Serialize;
use ticked::TickedState;

use crate::{
    axis::{
        movement_parameters::MoveParams,
        signal::{Tension, Trigger},
        state::MotionState,
    },
    geometry::MotionProfile,
};

/// Signals sampled once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Inputs {
    pub trigger: Trigger,
    pub tension: Tension,
    pub feed_reached: bool,
    pub take_reached: bool,
}

impl Inputs {
    pub fn from_flags(
        feed_flag: bool,
        feed_reached: bool,
        take_flag: bool,
        take_reached: bool,
    ) -> Self {
        Self {
            trigger: Trigger::from_flag(feed_flag),
            tension: Tension::from_flag(take_flag),
            feed_reached,
            take_reached,
        }
    }
}

impl Default for Inputs {
    /// Button released, paper taut, nothing reached: the resting inputs.
    fn default() -> Self {
        Self {
            trigger: Trigger::Released,
            tension: Tension::Taut,
            feed_reached: false,
            take_reached: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Phase {
    Continuous(ContinuousState),
    Ticked(TickedState),
    Repeat(RepeatState),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoordinatorState {
    pub count: u64,
    pub phase: Phase,
}

impl CoordinatorState {
    pub fn new(mode: Mode) -> Self {
        let phase = match mode {
            Mode::Continuous => Phase::Continuous(ContinuousState::default()),
            Mode::Ticked => Phase::Ticked(TickedState::default()),
            Mode::Repeat => Phase::Repeat(RepeatState::default()),
        };
        Self { count: 0, phase }
    }

    pub fn mode(&self) -> Mode {
        match self.phase {
            Phase::Continuous(_) => Mode::Continuous,
            Phase::Ticked(_) => Mode::Ticked,
            Phase::Repeat(_) => Mode::Repeat,
        }
    }

    pub fn feed_state(&self) -> MotionState {
        match &self.phase {
            Phase::Continuous(s) => s.feed,
            Phase::Ticked(s) => s.feed_state(),
            Phase::Repeat(_) => MotionState::Idle,
        }
    }

    pub fn take_state(&self) -> MotionState {
        match &self.phase {
            Phase::Continuous(s) => s.take,
            Phase::Ticked(s) => s.take_state(),
            Phase::Repeat(s) => s.phase,
        }
    }

    pub fn move_left(&self) -> Option<f64> {
        match &self.phase {
            Phase::Ticked(s) => Some(s.move_left),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.feed_state().is_idle() && self.take_state().is_idle()
    }
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count: {}   feed: {}   take: {}",
            self.count,
            self.feed_state(),
            self.take_state()
        )?;
        if let Some(left) = self.move_left() {
            write!(f, "   left: {}", left)?;
        }
        Ok(())
    }
}

pub struct Coordinator {
    mode: Mode,
    profile: MotionProfile,
    repeat: MoveParams,
}

impl Coordinator {
    pub fn new(mode: Mode, profile: MotionProfile, repeat: MoveParams) -> Self {
        Self {
            mode,
            profile,
            repeat,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }

    pub fn initial_state(&self) -> CoordinatorState {
        CoordinatorState::new(self.mode)
    }

    /// Evaluate one tick. For two-axis modes the feed is always evaluated
    /// before the take-up.
    pub fn advance(
        &self,
        state: CoordinatorState,
        inputs: &Inputs,
    ) -> (CoordinatorState, Vec<AxisCommand>) {
        let mut commands = Vec::new();

        let phase = match state.phase {
            Phase::Continuous(s) => {
                Phase::Continuous(continuous::advance(s, inputs, &self.profile, &mut commands))
            }
            Phase::Ticked(s) => {
                Phase::Ticked(ticked::advance(s, inputs, &self.profile, &mut commands))
            }
            Phase::Repeat(s) => {
                Phase::Repeat(repeat::advance(s, inputs, self.repeat, &mut commands))
            }
        };

        let next = CoordinatorState {
            count: state.count + 1,
            phase,
        };
        (next, commands)
    }

    /// Park every machine and stop every axis the mode drives. Applying it
    /// twice yields the same state and commands as applying it once.
    pub fn halt(&self, state: CoordinatorState) -> (CoordinatorState, Vec<AxisCommand>) {
        let (phase, commands) = match state.phase {
            Phase::Continuous(_) => (
                Phase::Continuous(ContinuousState::default()),
                vec![AxisCommand::halt(AxisId::Feed), AxisCommand::halt(AxisId::Take)],
            ),
            Phase::Ticked(_) => (
                Phase::Ticked(TickedState::default()),
                vec![AxisCommand::halt(AxisId::Feed), AxisCommand::halt(AxisId::Take)],
            ),
            Phase::Repeat(_) => (
                Phase::Repeat(RepeatState {
                    phase: MotionState::Idle,
                    held: true,
                }),
                vec![AxisCommand::halt(AxisId::Take)],
            ),
        };

        let next = CoordinatorState {
            count: state.count,
            phase,
        };
        (next, commands)
    }

    /// Release an operator halt. Only repeat mode holds after a halt; the
    /// other modes already wait for the next button press.
    pub fn resume(&self, state: CoordinatorState) -> CoordinatorState {
        match state.phase {
            Phase::Repeat(s) if s.held => CoordinatorState {
                phase: Phase::Repeat(RepeatState {
                    phase: MotionState::Idle,
                    held: false,
                }),
                ..state
            },
            _ => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn coordinator(mode: Mode) -> Coordinator {
        let config = AppConfig::default();
        Coordinator::new(
            mode,
            MotionProfile::from_config(&config),
            MoveParams::new(config.repeat.velocity, config.repeat.steps),
        )
    }

    fn press() -> Inputs {
        Inputs {
            trigger: Trigger::Pressed,
            ..Inputs::default()
        }
    }

    fn reached() -> Inputs {
        Inputs {
            feed_reached: true,
            ..Inputs::default()
        }
    }

    #[test]
    fn count_increments_every_tick() {
        let coordinator = coordinator(Mode::Continuous);
        let mut state = coordinator.initial_state();
        for _ in 0..5 {
            state = coordinator.advance(state, &Inputs::default()).0;
        }
        assert_eq!(state.count, 5);
        assert!(state.is_idle());
    }

    #[test]
    fn tick_line_format() {
        let coordinator = coordinator(Mode::Continuous);
        let (state, _) = coordinator.advance(coordinator.initial_state(), &press());
        assert_eq!(state.to_string(), "count: 1   feed: armed   take: idle");

        let coordinator = self::coordinator(Mode::Ticked);
        let (state, _) = coordinator.advance(coordinator.initial_state(), &press());
        assert_eq!(
            state.to_string(),
            "count: 1   feed: armed   take: idle   left: 12"
        );
    }

    #[test]
    fn ticked_cycle_makes_three_partial_moves() {
        let coordinator = coordinator(Mode::Ticked);
        let profile = coordinator.profile().clone();
        let mut state = coordinator.initial_state();
        let mut feed_moves = Vec::new();
        let mut take_moves = 0;

        let (next, _) = coordinator.advance(state, &press());
        state = next;

        for _ in 0..100 {
            // Release, reach the feed target, then report tension.
            for inputs in [Inputs::default(), reached(), Inputs::default()] {
                let (next, commands) = coordinator.advance(state, &inputs);
                state = next;
                for command in commands {
                    match command {
                        AxisCommand::Move {
                            axis: AxisId::Feed,
                            params,
                        } => feed_moves.push(params),
                        AxisCommand::Move {
                            axis: AxisId::Take,
                            ..
                        } => take_moves += 1,
                        AxisCommand::Halt { .. } => {}
                    }
                }
            }
            if state.is_idle() {
                break;
            }
        }

        assert_eq!(feed_moves.len(), 3);
        assert_eq!(take_moves, 3);
        assert!(feed_moves.iter().all(|p| *p == profile.feed_move(4.0)));
        assert!(state.is_idle());
        assert_eq!(state.move_left(), Some(0.0));
    }

    #[test]
    fn halt_parks_every_mode() {
        for mode in [Mode::Continuous, Mode::Ticked, Mode::Repeat] {
            let coordinator = coordinator(mode);
            let mut state = coordinator.initial_state();
            for inputs in [press(), Inputs::default(), reached()] {
                state = coordinator.advance(state, &inputs).0;
            }

            let (halted, commands) = coordinator.halt(state);
            assert!(halted.is_idle(), "{mode} not idle after halt");
            let expected = if mode == Mode::Repeat { 1 } else { 2 };
            assert_eq!(commands.len(), expected);
            assert!(commands.iter().all(|c| !c.is_move()));

            let (again, again_commands) = coordinator.halt(halted);
            assert_eq!(again, halted);
            assert_eq!(again_commands, commands);

            let (next, commands) = coordinator.advance(halted, &Inputs::default());
            assert!(next.feed_state().is_idle(), "{mode} feed left idle");
            assert!(commands.iter().all(|c| !c.is_move()), "{mode} moved after halt");
        }
    }

    #[test]
    fn repeat_halt_leaves_feed_alone_and_resume_restarts() {
        let coordinator = coordinator(Mode::Repeat);
        let slack = Inputs {
            tension: Tension::Slack,
            ..Inputs::default()
        };

        let (moving, _) = coordinator.advance(coordinator.initial_state(), &slack);
        let (halted, commands) = coordinator.halt(moving);
        assert_eq!(commands, vec![AxisCommand::halt(AxisId::Take)]);

        let (still_held, commands) = coordinator.advance(halted, &slack);
        assert!(still_held.is_idle());
        assert!(commands.iter().all(|c| !c.is_move()));

        let resumed = coordinator.resume(still_held);
        assert_eq!(coordinator.resume(resumed), resumed);
        let (next, commands) = coordinator.advance(resumed, &slack);
        assert_eq!(next.take_state(), MotionState::Moving);
        assert_eq!(
            commands,
            vec![AxisCommand::move_axis(AxisId::Take, coordinator.repeat)]
        );
    }
}
