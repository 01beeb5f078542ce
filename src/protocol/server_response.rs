use serde::{Deserialize, Serialize};

pub const PARSE_ERROR: &str = "parse_error";
pub const LOOP_ERROR: &str = "loop_error";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ServerResponse {
    #[serde(rename = "success")]
    Success {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        data: serde_json::Value,
    },
    #[serde(rename = "error")]
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
}

impl ServerResponse {
    pub fn success(id: Option<String>, data: serde_json::Value) -> Self {
        Self::Success { id, data }
    }

    pub fn error(id: Option<String>, message: String, code: &str) -> Self {
        Self::Error {
            id,
            message,
            code: Some(code.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ServerResponse::Success { .. })
    }
}
