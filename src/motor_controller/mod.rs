//! HTTP driver for Nanotec N5 stepper controllers.

pub mod client;
pub mod error;
pub mod registers;

use anyhow::Result;
use tracing::{debug, info};

use crate::{
    axis::{movement_parameters::MoveParams, Axis},
    config::DriverConfig,
    geometry::DEVICE_MAX_VELOCITY,
};
use client::RegisterClient;
use error::DriverError;
use registers::*;

pub struct NanotecController {
    name: String,
    client: RegisterClient,
}

impl NanotecController {
    pub fn new(name: &str, address: &str, config: &DriverConfig) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            client: RegisterClient::new(address, config)?,
        })
    }

    pub fn address(&self) -> &str {
        self.client.host()
    }

    async fn control(&self, word: i64) -> Result<(), DriverError> {
        self.client.write(CONTROL_WORD, word, RegisterType::U16).await
    }
}

#[async_trait::async_trait]
impl Axis for NanotecController {
    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&self) -> Result<()> {
        info!("Initializing axis {} at {}", self.name, self.address());
        self.client
            .write(INPUT_1_VOLTAGE_RANGE, INPUT_RANGE_24V, RegisterType::U32)
            .await?;
        self.client
            .write(OPERATING_MODE, PROFILE_POSITION_MODE, RegisterType::U08)
            .await?;
        self.halt().await
    }

    async fn move_relative(&self, params: MoveParams) -> Result<()> {
        if f64::from(params.velocity) > DEVICE_MAX_VELOCITY {
            return Err(DriverError::OutOfRange {
                what: "velocity",
                value: i64::from(params.velocity),
            }
            .into());
        }
        if !params.steps_in_range() {
            return Err(DriverError::OutOfRange {
                what: "steps",
                value: params.steps,
            }
            .into());
        }

        debug!(
            "Axis {}: relative move of {} ticks at {}",
            self.name, params.steps, params.velocity
        );
        self.client
            .write(PROFILE_VELOCITY, i64::from(params.velocity), RegisterType::U32)
            .await?;
        self.client
            .write(TARGET_POSITION, params.steps, RegisterType::S32)
            .await?;

        for word in [ENABLE_VOLTAGE, SWITCH_ON, ENABLE_RELATIVE, START_RELATIVE] {
            self.control(word).await?;
        }
        Ok(())
    }

    async fn halt(&self) -> Result<()> {
        self.control(CANCEL_MOVE).await?;
        self.control(HOLD).await?;
        Ok(())
    }

    async fn check_reached(&self) -> Result<bool> {
        let status = self.client.read(STATUS_WORD).await?;
        Ok(status & TARGET_REACHED != 0)
    }

    async fn check_flag(&self) -> Result<bool> {
        let inputs = self.client.read(DIGITAL_INPUTS).await?;
        Ok(inputs & INPUT_1 == 0)
    }
}
