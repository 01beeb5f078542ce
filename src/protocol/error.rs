#[derive(Debug)]
pub enum ProtocolError {
    InvalidJson(String),
    Serialize(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::InvalidJson(msg) => write!(f, "Invalid JSON: {}", msg),
            ProtocolError::Serialize(msg) => write!(f, "Cannot encode response: {}", msg),
        }
    }
}

impl std::error::Error for ProtocolError {}
