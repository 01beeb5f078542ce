use anyhow::Result;
use tokio::sync::{mpsc, oneshot};

use crate::coordinator::CoordinatorState;

/// Requests from outside the control loop, answered between ticks.
#[derive(Debug)]
pub enum ControlRequest {
    GetState {
        resp: oneshot::Sender<CoordinatorState>,
    },
    Halt {
        resp: oneshot::Sender<Result<CoordinatorState>>,
    },
    Resume {
        resp: oneshot::Sender<CoordinatorState>,
    },
}

/// Cloneable sender side used by the socket server.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    sender: mpsc::Sender<ControlRequest>,
}

impl ControlHandle {
    pub(crate) fn new(sender: mpsc::Sender<ControlRequest>) -> Self {
        Self { sender }
    }

    pub async fn get_state(&self) -> Result<CoordinatorState> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(ControlRequest::GetState { resp: tx })
            .await
            .map_err(|_| anyhow::anyhow!("Control loop is not running"))?;
        Ok(rx.await?)
    }

    pub async fn halt(&self) -> Result<CoordinatorState> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(ControlRequest::Halt { resp: tx })
            .await
            .map_err(|_| anyhow::anyhow!("Control loop is not running"))?;
        rx.await?
    }

    pub async fn resume(&self) -> Result<CoordinatorState> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(ControlRequest::Resume { resp: tx })
            .await
            .map_err(|_| anyhow::anyhow!("Control loop is not running"))?;
        Ok(rx.await?)
    }
}
