use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketServerConfig {
    #[serde(alias = "path")]
    pub socket_path: String,
    pub max_connections: usize,
    /// Longest accepted request line, in bytes.
    pub buffer_size: usize,
}

impl Default for SocketServerConfig {
    fn default() -> Self {
        Self {
            socket_path: "/tmp/scroll-feeder.sock".to_string(),
            max_connections: 8,
            buffer_size: 8192,
        }
    }
}
