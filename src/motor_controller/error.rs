#[derive(Debug)]
pub enum DriverError {
    OutOfRange { what: &'static str, value: i64 },
    Http(String),
    Status { url: String, status: u16 },
    InvalidResponse(String),
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverError::OutOfRange { what, value } => {
                write!(f, "{} out of device range: {}", what, value)
            }
            DriverError::Http(msg) => write!(f, "HTTP error: {}", msg),
            DriverError::Status { url, status } => {
                write!(f, "controller returned {} for {}", status, url)
            }
            DriverError::InvalidResponse(body) => write!(f, "Invalid register value: {}", body),
        }
    }
}

impl std::error::Error for DriverError {}

impl From<reqwest::Error> for DriverError {
    fn from(err: reqwest::Error) -> Self {
        DriverError::Http(err.to_string())
    }
}
