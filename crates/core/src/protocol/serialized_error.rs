//! Plain, transmittable snapshots of failures.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::backtrace::BacktraceStatus;
use std::error::Error as StdError;
use std::fmt;

/// A failure flattened into data: name, message, optional stack, nested cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedError {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<SerializedError>>,
}

impl SerializedError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
            cause: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_cause(mut self, cause: SerializedError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Serialize an `anyhow` error, its context chain and its backtrace.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let mut serialized = Self::from_chain(err.chain());
        let backtrace = err.backtrace();
        if backtrace.status() == BacktraceStatus::Captured {
            serialized.stack = Some(backtrace.to_string());
        }
        serialized
    }

    /// Serialize any error by walking its `source()` chain.
    pub fn from_std(err: &(dyn StdError + 'static)) -> Self {
        Self::from_chain(std::iter::successors(Some(err), |&e| e.source()))
    }

    /// Serialize the payload of a caught panic.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "panicked with a non-string payload".to_string()
        };
        Self::new("Panic", message)
    }

    fn from_chain<'a>(chain: impl Iterator<Item = &'a (dyn StdError + 'static)>) -> Self {
        let layers: Vec<_> = chain.collect();
        let mut serialized: Option<SerializedError> = None;
        for layer in layers.into_iter().rev() {
            let mut current = Self::new(error_name(layer), layer.to_string());
            current.cause = serialized.map(Box::new);
            serialized = Some(current);
        }
        serialized.unwrap_or_else(|| Self::new("Error", "unknown error"))
    }

    /// This error followed by each nested cause.
    pub fn chain(&self) -> impl Iterator<Item = &SerializedError> {
        std::iter::successors(Some(self), |e| e.cause.as_deref())
    }
}

fn error_name(err: &(dyn StdError + 'static)) -> String {
    if let Some(err) = err.downcast_ref::<crate::error::Error>() {
        return err.name().to_string();
    }
    if err.is::<std::io::Error>() {
        return "IoError".to_string();
    }
    if err.is::<serde_json::Error>() {
        return "SerializationError".to_string();
    }
    "Error".to_string()
}

impl From<&anyhow::Error> for SerializedError {
    fn from(err: &anyhow::Error) -> Self {
        Self::from_anyhow(err)
    }
}

impl fmt::Display for SerializedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)?;
        for cause in self.chain().skip(1) {
            write!(f, "\n  caused by {}: {}", cause.name, cause.message)?;
        }
        Ok(())
    }
}
