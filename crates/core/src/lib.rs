//! appreflect - Reflect over an application without running its server
//!
//! This crate provides functionality to:
//! - Run an application's startup in a disposable child process
//! - Report its registered plugins, or generate type artifacts from its schema
//! - Carry results and failures back over a narrow, serializable channel
pub mod artifacts;
pub mod config;
pub mod error;
pub mod interfaces;
pub mod layout;
pub mod protocol;
pub mod reflect;
pub mod runner;
pub mod stage;
pub mod types;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

// Re-export main API components
pub use artifacts::FsArtifactWriter;
pub use config::{ReflectionConfig, Settings};
pub use interfaces::{
    AppRunner, AppState, ArtifactRequest, ArtifactWriter, PluginLoader, ReflectionHost,
    RunnerOptions,
};
pub use layout::Layout;
pub use protocol::{Channel, MemoryChannel, Message, SerializedError};
pub use reflect::{ChildCommand, ReflectOptions, Reflection, ReflectionOutcome, reflect};
pub use runner::{Reflector, run_child, run_with_channel};
pub use stage::{ReflectionStage, StageSelector};
