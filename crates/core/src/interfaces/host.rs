use super::{AppRunner, ArtifactWriter, PluginLoader, RunnerOptions};
use crate::layout::Layout;

/// The user's application as seen by a reflection process.
///
/// A reflection binary links the application in and implements this trait;
/// [`crate::runner::run_child`] does the rest.
pub trait ReflectionHost {
    /// Whatever the application's entry point exports.
    type App;

    /// Load the application. This runs user code.
    fn import_app(&self, layout: &Layout) -> anyhow::Result<Self::App>;

    /// Build a runner for `app`.
    fn create_runner(
        &self,
        layout: &Layout,
        app: Self::App,
        options: RunnerOptions,
    ) -> anyhow::Result<Box<dyn AppRunner>>;

    fn plugin_loader(&self) -> &dyn PluginLoader;

    fn artifact_writer(&self) -> &dyn ArtifactWriter;
}
