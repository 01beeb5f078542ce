//! Spool geometry: converting linear paper travel into motor ticks and
//! motor velocity.

use std::f64::consts::PI;

use crate::{
    axis::movement_parameters::MoveParams,
    config::{AppConfig, MotionConfig, SpoolConfig},
};

/// Highest profile velocity the controllers accept.
pub const DEVICE_MAX_VELOCITY: f64 = 250.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spool {
    pub diameter: f64,
    pub direction: f64,
}

impl Spool {
    pub fn new(diameter: f64, direction: i8) -> Self {
        Self {
            diameter,
            direction: f64::from(direction.signum()),
        }
    }

    pub fn from_config(config: &SpoolConfig) -> Self {
        Self::new(config.diameter, config.direction)
    }

    pub fn circumference(&self) -> f64 {
        PI * self.diameter
    }

    /// Motor ticks needed to move `inches` of paper, signed by direction.
    pub fn steps_for(&self, inches: f64, ticks_per_rev: u32) -> f64 {
        inches / self.circumference() * f64::from(ticks_per_rev) * self.direction
    }

    /// Unclamped device velocity for a linear speed in inches per minute.
    pub fn velocity_for(&self, linear_velocity: f64, ticks_per_rev: u32) -> f64 {
        linear_velocity / self.circumference() * f64::from(ticks_per_rev) / 60.0
    }
}

pub fn clamp_velocity(velocity: f64, max_velocity: f64) -> f64 {
    velocity.min(max_velocity)
}

/// Everything the coordinator needs to turn "move N inches" into commands.
#[derive(Debug, Clone)]
pub struct MotionProfile {
    pub feed: Spool,
    pub take: Spool,
    pub ticks_per_rev: u32,
    pub feed_velocity: f64,
    pub take_velocity: f64,
    pub move_length: f64,
    pub move_step: f64,
}

impl MotionProfile {
    pub fn new(feed: Spool, take: Spool, motion: &MotionConfig) -> Self {
        let max_velocity = motion.max_velocity.min(DEVICE_MAX_VELOCITY);
        let feed_velocity = clamp_velocity(
            feed.velocity_for(motion.linear_velocity, motion.ticks_per_rev),
            max_velocity,
        );
        let take_velocity = clamp_velocity(
            take.velocity_for(motion.linear_velocity, motion.ticks_per_rev) * motion.take_overage,
            max_velocity,
        );

        Self {
            feed,
            take,
            ticks_per_rev: motion.ticks_per_rev,
            feed_velocity,
            take_velocity,
            move_length: motion.move_length,
            move_step: motion.move_step,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Spool::from_config(&config.feed),
            Spool::from_config(&config.take),
            &config.motion,
        )
    }

    pub fn feed_steps(&self, inches: f64) -> f64 {
        self.feed.steps_for(inches, self.ticks_per_rev)
    }

    pub fn take_steps(&self, inches: f64) -> f64 {
        self.take.steps_for(inches, self.ticks_per_rev)
    }

    pub fn feed_move(&self, inches: f64) -> MoveParams {
        MoveParams::from_profile(self.feed_velocity, self.feed_steps(inches))
    }

    pub fn take_move(&self, inches: f64) -> MoveParams {
        MoveParams::from_profile(self.take_velocity, self.take_steps(inches))
    }
}
