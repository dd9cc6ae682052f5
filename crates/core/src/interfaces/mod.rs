//! Seams to the collaborators a reflection process drives.
//!
//! The user's reflection binary implements [`ReflectionHost`]; everything the
//! application does at startup happens behind these traits.

use crate::types::{PluginDescriptor, ResolvedSchema, SchemaSettings};

pub mod app_runner;
pub mod artifact_writer;
pub mod host;
pub mod plugin_loader;

pub use app_runner::AppRunner;
pub use artifact_writer::{ArtifactRequest, ArtifactWriter};
pub use host::ReflectionHost;
pub use plugin_loader::PluginLoader;

/// Options the app runner is constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// When false, the runner must let every startup failure propagate out of
    /// `start` instead of recovering from it internally.
    pub catch_unhandled_errors: bool,
}

impl RunnerOptions {
    pub fn for_reflection() -> Self {
        Self {
            catch_unhandled_errors: false,
        }
    }
}

/// Read-only snapshot of the application after startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// Registered plugins, in registration order.
    pub plugins: Vec<PluginDescriptor>,
    pub schema: Option<ResolvedSchema>,
    pub schema_settings: SchemaSettings,
}
