pub mod config;

use anyhow::Result;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::{
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, error, info, warn};

use crate::{
    protocol::{
        client_command::ClientCommand,
        parse_command, serialize_response,
        server_response::{ServerResponse, LOOP_ERROR, PARSE_ERROR},
    },
    runner::command::ControlHandle,
};
use config::SocketServerConfig;

/// Operator endpoint for a running installation: query the coordinator
/// state, halt the axes or resume after a halt without stopping the process.
pub struct SocketServer {
    config: SocketServerConfig,
    control: ControlHandle,
    shutdown_tx: Option<tokio::sync::broadcast::Sender<()>>,
}

impl SocketServer {
    pub fn new(config: SocketServerConfig, control: ControlHandle) -> Self {
        Self {
            config,
            control,
            shutdown_tx: None,
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        if Path::new(&self.config.socket_path).exists() {
            tokio::fs::remove_file(&self.config.socket_path).await?;
        }

        let listener = UnixListener::bind(&self.config.socket_path)?;
        info!("Control socket listening on: {}", self.config.socket_path);

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::broadcast::channel(1);
        self.shutdown_tx = Some(shutdown_tx);

        let control = self.control.clone();
        let max_connections = self.config.max_connections;
        let max_line = self.config.buffer_size;

        tokio::spawn(async move {
            let active_connections = Arc::new(AtomicUsize::new(0));

            loop {
                tokio::select! {
                    accept_result = listener.accept() => {
                        match accept_result {
                            Ok((stream, _addr)) => {
                                let current = active_connections.load(Ordering::Relaxed);
                                if current >= max_connections {
                                    warn!("Maximum connections reached ({}), rejecting new connection", current);
                                    continue;
                                }

                                let count = active_connections.fetch_add(1, Ordering::Relaxed) + 1;
                                debug!("Operator connected. Active connections: {}", count);

                                let control = control.clone();
                                let mut client_shutdown = shutdown_rx.resubscribe();
                                let active = active_connections.clone();

                                tokio::spawn(async move {
                                    if let Err(e) = Self::handle_client(stream, control, max_line, &mut client_shutdown).await {
                                        error!("Client handler error: {}", e);
                                    }

                                    let remaining = active.fetch_sub(1, Ordering::Relaxed) - 1;
                                    debug!("Operator disconnected. Active connections: {}", remaining);
                                });
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {}", e);
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Control socket shutting down");
                        break;
                    }
                }
            }
        });

        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        if let Some(shutdown_tx) = &self.shutdown_tx {
            let _ = shutdown_tx.send(());
        }

        if Path::new(&self.config.socket_path).exists() {
            tokio::fs::remove_file(&self.config.socket_path).await?;
        }

        info!("Control socket shutdown complete");
        Ok(())
    }

    async fn handle_client(
        stream: UnixStream,
        control: ControlHandle,
        max_line: usize,
        shutdown_rx: &mut tokio::sync::broadcast::Receiver<()>,
    ) -> Result<()> {
        let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(max_line));

        loop {
            tokio::select! {
                line_result = framed.next() => {
                    match line_result {
                        Some(Ok(line)) => {
                            debug!("Received command: {}", line);

                            let response = Self::process_command(&line, &control).await;
                            let response_json = serialize_response(&response)?;

                            if let Err(e) = framed.send(response_json).await {
                                error!("Failed to send response: {}", e);
                                break;
                            }
                        }
                        Some(Err(e)) => {
                            error!("Error reading from client: {}", e);
                            break;
                        }
                        None => break,
                    }
                }
                _ = shutdown_rx.recv() => {
                    debug!("Shutdown signal received, closing client connection");
                    break;
                }
            }
        }

        Ok(())
    }

    pub async fn process_command(line: &str, control: &ControlHandle) -> ServerResponse {
        let command = match parse_command(line) {
            Ok(cmd) => cmd,
            Err(e) => {
                return ServerResponse::error(
                    None,
                    format!("Failed to parse command: {}", e),
                    PARSE_ERROR,
                );
            }
        };

        let command_id = command.id().cloned();

        match Self::execute_command(command, control).await {
            Ok(data) => ServerResponse::success(command_id, data),
            Err(e) => ServerResponse::error(command_id, e.to_string(), LOOP_ERROR),
        }
    }

    async fn execute_command(
        command: ClientCommand,
        control: &ControlHandle,
    ) -> Result<serde_json::Value> {
        match command {
            ClientCommand::Ping { .. } => Ok(json!({
                "message": "pong",
                "timestamp": chrono::Utc::now().to_rfc3339()
            })),
            ClientCommand::GetState { .. } => {
                let state = control.get_state().await?;
                Ok(json!({
                    "line": state.to_string(),
                    "state": serde_json::to_value(state)?,
                }))
            }
            ClientCommand::Halt { .. } => {
                let state = control.halt().await?;
                Ok(json!({
                    "action": "halt",
                    "line": state.to_string(),
                }))
            }
            ClientCommand::Resume { .. } => {
                let state = control.resume().await?;
                Ok(json!({
                    "action": "resume",
                    "line": state.to_string(),
                }))
            }
        }
    }
}
