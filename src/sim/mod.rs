//! In-process stand-ins for the two controllers, used by `--sim`.
//!
//! Both axes share a [`PaperPath`]: paper let out by the feed adds slack,
//! paper pulled in by the take-up removes it, and the take-up's flag reads
//! taut whenever no slack is left. The feed's flag follows a scripted button
//! that is pressed for two polls at the start of every interval.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    axis::{movement_parameters::MoveParams, Axis},
    config::AppConfig,
    geometry::Spool,
};

const PRESS_POLLS: u64 = 2;

#[derive(Debug, Default)]
pub struct PaperPath {
    /// Loose paper between the spools, in inches.
    pub slack: f64,
    button_polls: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimRole {
    Feed { press_interval: u64 },
    Take,
}

#[derive(Debug, Default)]
struct SimMotion {
    remaining: u64,
}

pub struct SimulatedAxis {
    name: String,
    role: SimRole,
    inches_per_tick: f64,
    ticks_per_poll: u64,
    motion: Mutex<SimMotion>,
    path: Arc<Mutex<PaperPath>>,
}

impl SimulatedAxis {
    pub fn new(
        name: &str,
        role: SimRole,
        spool: Spool,
        ticks_per_rev: u32,
        ticks_per_poll: u32,
        path: Arc<Mutex<PaperPath>>,
    ) -> Self {
        Self {
            name: name.to_string(),
            role,
            inches_per_tick: spool.circumference() / f64::from(ticks_per_rev),
            ticks_per_poll: u64::from(ticks_per_poll.max(1)),
            motion: Mutex::new(SimMotion::default()),
            path,
        }
    }

    pub async fn is_moving(&self) -> bool {
        self.motion.lock().await.remaining > 0
    }
}

/// Build a feed/take-up pair sharing one paper path, starting taut.
pub fn simulated_pair(config: &AppConfig) -> (Arc<SimulatedAxis>, Arc<SimulatedAxis>) {
    let path = Arc::new(Mutex::new(PaperPath::default()));
    let ticks_per_rev = config.motion.ticks_per_rev;

    let feed = SimulatedAxis::new(
        "feed",
        SimRole::Feed {
            press_interval: u64::from(config.sim.press_interval_ticks.max(1)),
        },
        Spool::from_config(&config.feed),
        ticks_per_rev,
        config.sim.ticks_per_poll,
        path.clone(),
    );
    let take = SimulatedAxis::new(
        "take",
        SimRole::Take,
        Spool::from_config(&config.take),
        ticks_per_rev,
        config.sim.ticks_per_poll,
        path,
    );

    (Arc::new(feed), Arc::new(take))
}

#[async_trait::async_trait]
impl Axis for SimulatedAxis {
    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&self) -> Result<()> {
        info!("Simulated axis {} ready", self.name);
        self.halt().await
    }

    async fn move_relative(&self, params: MoveParams) -> Result<()> {
        debug!(
            "Simulated axis {}: move {} ticks at {}",
            self.name, params.steps, params.velocity
        );
        let mut motion = self.motion.lock().await;
        motion.remaining = u64::from(params.steps.unsigned_abs());
        Ok(())
    }

    async fn halt(&self) -> Result<()> {
        self.motion.lock().await.remaining = 0;
        Ok(())
    }

    async fn check_reached(&self) -> Result<bool> {
        let mut motion = self.motion.lock().await;
        if motion.remaining == 0 {
            return Ok(true);
        }

        let travel = motion.remaining.min(self.ticks_per_poll);
        motion.remaining -= travel;

        let inches = travel as f64 * self.inches_per_tick;
        let mut path = self.path.lock().await;
        match self.role {
            SimRole::Feed { .. } => path.slack += inches,
            SimRole::Take => path.slack = (path.slack - inches).max(0.0),
        }

        Ok(motion.remaining == 0)
    }

    async fn check_flag(&self) -> Result<bool> {
        let mut path = self.path.lock().await;
        match self.role {
            SimRole::Feed { press_interval } => {
                let poll = path.button_polls;
                path.button_polls += 1;
                Ok(poll % press_interval >= PRESS_POLLS)
            }
            SimRole::Take => Ok(path.slack <= 0.0),
        }
    }
}
