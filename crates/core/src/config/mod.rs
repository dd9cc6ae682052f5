//! Configuration management for appreflect

mod reflection;
mod settings;

// Re-export main types
pub use reflection::{
    CHANNEL_ENV, CHANNEL_TOKEN_ENV, LAYOUT_ENV, ReflectionConfig, STAGE_ENV,
};
pub use settings::{DEFAULT_TIMEOUT_SECS, Settings};
