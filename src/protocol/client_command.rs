use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    #[serde(rename = "ping")]
    Ping {
        #[serde(default)]
        id: Option<String>,
    },
    #[serde(rename = "get_state")]
    GetState {
        #[serde(default)]
        id: Option<String>,
    },
    #[serde(rename = "halt")]
    Halt {
        #[serde(default)]
        id: Option<String>,
    },
    #[serde(rename = "resume")]
    Resume {
        #[serde(default)]
        id: Option<String>,
    },
}

impl ClientCommand {
    pub fn id(&self) -> Option<&String> {
        match self {
            ClientCommand::Ping { id }
            | ClientCommand::GetState { id }
            | ClientCommand::Halt { id }
            | ClientCommand::Resume { id } => id.as_ref(),
        }
    }
}
