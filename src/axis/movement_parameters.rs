use serde::{Deserialize, Serialize};

/// A relative move as sent to the controller: velocity in device units and a
/// signed step count in motor ticks.
///
/// `steps` is wider than the controller's 32-bit target register so that an
/// oversized move reaches the driver intact and is rejected there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveParams {
    pub velocity: u32,
    pub steps: i64,
}

impl MoveParams {
    pub fn new(velocity: u32, steps: i64) -> Self {
        Self { velocity, steps }
    }

    /// Round fractional geometry results to whole device units. Negative
    /// velocities become 0.
    pub fn from_profile(velocity: f64, steps: f64) -> Self {
        Self {
            velocity: velocity.round().max(0.0) as u32,
            steps: steps.round() as i64,
        }
    }

    /// Whether the step count fits the controller's signed 32-bit target.
    pub fn steps_in_range(&self) -> bool {
        i32::try_from(self.steps).is_ok()
    }
}
