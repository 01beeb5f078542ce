use std::time::Duration;

use tracing::trace;

use super::{
    error::DriverError,
    registers::{decode, Register, RegisterType},
};
use crate::config::DriverConfig;

/// Register read/write over the controller's REST interface.
pub struct RegisterClient {
    http: reqwest::Client,
    host: String,
    settle: Duration,
}

impl RegisterClient {
    pub fn new(host: &str, config: &DriverConfig) -> Result<Self, DriverError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            host: host.to_string(),
            settle: Duration::from_millis(config.write_settle_ms),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub async fn write(
        &self,
        register: Register,
        value: i64,
        ty: RegisterType,
    ) -> Result<(), DriverError> {
        let url = register.url(&self.host);
        let body = ty.encode(value)?;
        trace!("POST {} {}", url, body);

        let response = self.http.post(&url).body(body).send().await?;
        if !response.status().is_success() {
            return Err(DriverError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }
        Ok(())
    }

    pub async fn read(&self, register: Register) -> Result<u32, DriverError> {
        let url = register.url(&self.host);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(DriverError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        trace!("GET {} -> {}", url, body.trim());
        decode(&body)
    }
}
