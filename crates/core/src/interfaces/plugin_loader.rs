use crate::types::{PluginDescriptor, RuntimePlugin};

/// Imports the runtime half of registered plugins.
pub trait PluginLoader {
    /// Import and load each plugin, in order. Loading may run plugin code.
    fn import_and_load_runtime_plugins(
        &self,
        plugins: &[PluginDescriptor],
    ) -> anyhow::Result<Vec<RuntimePlugin>>;
}
