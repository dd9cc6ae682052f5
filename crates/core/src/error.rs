use std::io;

/// Errors that can occur during appreflect operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Layout descriptor missing: {0} is not set")]
    LayoutMissing(String),

    #[error("Invalid layout descriptor: {0}")]
    LayoutInvalid(String),

    #[error("Messaging channel unavailable: {0}")]
    ChannelUnavailable(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Resolved schema missing from the started application state")]
    SchemaMissing,

    #[error("Failed to spawn reflection process '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Stable variant name, used as the `name` of a serialized error.
    pub fn name(&self) -> &'static str {
        match self {
            Error::LayoutMissing(_) => "LayoutMissing",
            Error::LayoutInvalid(_) => "LayoutInvalid",
            Error::ChannelUnavailable(_) => "ChannelUnavailable",
            Error::ProtocolError(_) => "ProtocolError",
            Error::Timeout(_) => "Timeout",
            Error::SchemaMissing => "SchemaMissing",
            Error::SpawnFailed { .. } => "SpawnFailed",
            Error::ConfigError(_) => "ConfigError",
            Error::IoError(_) => "IoError",
            Error::SerializationError(_) => "SerializationError",
            Error::Other(_) => "Error",
        }
    }
}

/// Result type alias for appreflect operations
pub type Result<T> = std::result::Result<T, Error>;
