pub mod plugin;
pub mod schema;

// Re-export commonly used types
pub use plugin::{PluginDescriptor, RuntimePlugin};
pub use schema::{ResolvedSchema, SchemaSettings};
