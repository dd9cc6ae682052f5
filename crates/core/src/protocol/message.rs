use super::serialized_error::SerializedError;
use crate::types::PluginDescriptor;
use serde::{Deserialize, Serialize};

/// Terminal message sent from the reflection process to its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum Message {
    SuccessPlugin { plugins: Vec<PluginDescriptor> },
    SuccessTypegen,
    Error { serialized_error: SerializedError },
}

impl Message {
    pub fn error(serialized_error: SerializedError) -> Self {
        Message::Error { serialized_error }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Message::SuccessPlugin { .. } => "success-plugin",
            Message::SuccessTypegen => "success-typegen",
            Message::Error { .. } => "error",
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Message::Error { .. })
    }
}

/// First frame on every channel connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handshake {
    pub protocol_version: u32,
    pub token: String,
}

impl Handshake {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            protocol_version: super::PROTOCOL_VERSION,
            token: token.into(),
        }
    }
}
