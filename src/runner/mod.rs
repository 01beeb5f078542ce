//! The control loop: poll the drivers, advance the coordinator, execute the
//! resulting commands, sleep, repeat.

pub mod command;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use crate::{
    axis::Axis,
    coordinator::{
        command::{AxisCommand, AxisId},
        config::{CoordinatorConfig, Mode},
        Coordinator, CoordinatorState, Inputs,
    },
};
use command::{ControlHandle, ControlRequest};

pub struct MotionRunner {
    coordinator: Coordinator,
    config: CoordinatorConfig,
    feed: Arc<dyn Axis>,
    take: Arc<dyn Axis>,
    state: CoordinatorState,
    requests: mpsc::Receiver<ControlRequest>,
}

impl MotionRunner {
    pub fn new(
        coordinator: Coordinator,
        config: CoordinatorConfig,
        feed: Arc<dyn Axis>,
        take: Arc<dyn Axis>,
    ) -> (Self, ControlHandle) {
        let (tx, rx) = mpsc::channel(16);
        let state = coordinator.initial_state();

        let runner = Self {
            coordinator,
            config,
            feed,
            take,
            state,
            requests: rx,
        };
        (runner, ControlHandle::new(tx))
    }

    pub fn state(&self) -> &CoordinatorState {
        &self.state
    }

    /// Whether the current mode reads and commands the feed axis.
    fn uses_feed(&self) -> bool {
        self.coordinator.mode() != Mode::Repeat
    }

    pub async fn initialize(&self) -> Result<()> {
        if self.uses_feed() {
            self.feed.initialize().await?;
        }
        self.take.initialize().await?;
        Ok(())
    }

    /// Sample the signals in a fixed order: feed flag, feed reached, take
    /// flag, take reached. In repeat mode the feed reads as released and
    /// never reached.
    pub async fn poll_inputs(&self) -> Result<Inputs> {
        let (feed_flag, feed_reached) = if self.uses_feed() {
            (
                self.feed.check_flag().await?,
                self.feed.check_reached().await?,
            )
        } else {
            (true, false)
        };
        let take_flag = self.take.check_flag().await?;
        let take_reached = self.take.check_reached().await?;
        Ok(Inputs::from_flags(
            feed_flag,
            feed_reached,
            take_flag,
            take_reached,
        ))
    }

    /// One full iteration without the trailing sleep.
    pub async fn tick(&mut self) -> Result<()> {
        let inputs = self.poll_inputs().await?;
        let (next, commands) = self.coordinator.advance(self.state, &inputs);

        if next.feed_state() != self.state.feed_state()
            || next.take_state() != self.state.take_state()
        {
            debug!(
                "feed {} -> {}, take {} -> {}",
                self.state.feed_state(),
                next.feed_state(),
                self.state.take_state(),
                next.take_state()
            );
        }

        self.state = next;
        self.dispatch(commands).await?;
        info!("{}", self.state);
        Ok(())
    }

    pub async fn halt(&mut self) -> Result<()> {
        let (next, commands) = self.coordinator.halt(self.state);
        self.state = next;
        self.dispatch(commands).await
    }

    /// Run until `shutdown` fires. Any driver error ends the loop and is
    /// returned to the caller.
    pub async fn run(&mut self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        self.initialize().await?;
        info!(
            "Control loop running in {} mode every {:?}",
            self.coordinator.mode(),
            self.config.tick_interval
        );

        loop {
            self.tick().await?;
            self.handle_requests().await?;

            tokio::select! {
                _ = tokio::time::sleep(self.config.tick_interval) => {}
                _ = shutdown.recv() => {
                    info!("Shutdown requested, halting axes");
                    self.halt().await?;
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_requests(&mut self) -> Result<()> {
        while let Ok(request) = self.requests.try_recv() {
            match request {
                ControlRequest::GetState { resp } => {
                    let _ = resp.send(self.state);
                }
                ControlRequest::Resume { resp } => {
                    info!("Resume requested over control socket");
                    self.state = self.coordinator.resume(self.state);
                    let _ = resp.send(self.state);
                }
                ControlRequest::Halt { resp } => {
                    info!("Halt requested over control socket");
                    match self.halt().await {
                        Ok(()) => {
                            let _ = resp.send(Ok(self.state));
                        }
                        Err(e) => {
                            let _ = resp.send(Err(anyhow::anyhow!("halt failed: {}", e)));
                            return Err(e);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    async fn dispatch(&self, commands: Vec<AxisCommand>) -> Result<()> {
        for command in commands {
            match command {
                AxisCommand::Move { axis, params } => {
                    debug!("{}: move {} ticks at {}", axis, params.steps, params.velocity);
                    self.axis(axis).move_relative(params).await?;
                }
                AxisCommand::Halt { axis } => self.axis(axis).halt().await?,
            }
        }
        Ok(())
    }

    fn axis(&self, id: AxisId) -> &Arc<dyn Axis> {
        match id {
            AxisId::Feed => &self.feed,
            AxisId::Take => &self.take,
        }
    }
}
