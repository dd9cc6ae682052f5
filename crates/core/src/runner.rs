//! The reflection process: start the application, do one stage of work,
//! report exactly one terminal message.

use crate::{
    config::ReflectionConfig,
    error::{Error, Result},
    interfaces::{AppRunner, ArtifactRequest, ReflectionHost, RunnerOptions},
    layout::Layout,
    protocol::{Channel, Message, SerializedError, TcpChannel},
    stage::ReflectionStage,
};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// Runs one reflection against a host.
pub struct Reflector<'a, H: ReflectionHost> {
    config: &'a ReflectionConfig,
    host: &'a H,
}

impl<'a, H: ReflectionHost> Reflector<'a, H> {
    pub fn new(config: &'a ReflectionConfig, host: &'a H) -> Self {
        Self { config, host }
    }

    /// Start the application and perform the configured stage.
    ///
    /// Application failures become an `error` message. The returned error is
    /// reserved for the channel itself failing.
    pub fn run(&self, layout: &Layout, channel: &mut dyn Channel) -> Result<()> {
        let started = guarded(|| {
            let app = self.host.import_app(layout)?;
            let mut runner = self
                .host
                .create_runner(layout, app, RunnerOptions::for_reflection())?;
            runner.start()?;
            Ok(runner)
        });
        let runner = match started {
            Ok(runner) => runner,
            Err(serialized_error) => {
                info!("Application failed to start: {}", serialized_error.message);
                return channel.send(&Message::error(serialized_error));
            }
        };
        debug!("Application started");

        if self.config.is_reflection_stage(ReflectionStage::Plugin) {
            let plugins = runner.state().plugins.clone();
            debug!("Reporting {} registered plugins", plugins.len());
            return channel.send(&Message::SuccessPlugin { plugins });
        }

        if self.config.is_reflection_stage(ReflectionStage::Typegen) {
            let message = match guarded(|| self.write_typegen(layout, runner.as_ref())) {
                Ok(()) => Message::SuccessTypegen,
                Err(serialized_error) => {
                    info!("Typegen failed: {}", serialized_error.message);
                    Message::error(serialized_error)
                }
            };
            return channel.send(&message);
        }

        warn!(
            "No reflection stage selected (got {:?}); exiting without a message",
            self.config.stage.raw()
        );
        Ok(())
    }

    fn write_typegen(&self, layout: &Layout, runner: &dyn AppRunner) -> anyhow::Result<()> {
        let state = runner.state();
        let schema = state.schema.as_ref().ok_or(Error::SchemaMissing)?;
        let plugins = self
            .host
            .plugin_loader()
            .import_and_load_runtime_plugins(&state.plugins)?;
        debug!("Loaded {} runtime plugins", plugins.len());

        self.host.artifact_writer().write_artifacts(ArtifactRequest {
            schema,
            layout,
            schema_settings: &state.schema_settings,
            plugins: &plugins,
        })
    }
}

/// Run `f`, turning both errors and panics into a [`SerializedError`].
fn guarded<T>(f: impl FnOnce() -> anyhow::Result<T>) -> std::result::Result<T, SerializedError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(SerializedError::from_anyhow(&err)),
        Err(payload) => Err(SerializedError::from_panic(&*payload)),
    }
}

/// Require the layout from `config`, then run against `channel`.
pub fn run_with_channel<H: ReflectionHost>(
    config: &ReflectionConfig,
    host: &H,
    channel: &mut dyn Channel,
) -> Result<()> {
    let layout = config.load_layout()?;
    Reflector::new(config, host).run(&layout, channel)
}

/// Entry point for a reflection binary.
///
/// Reads the configuration from the environment. A missing or malformed
/// layout, or a missing channel, is returned as an error without anything
/// being sent; the process should exit with a failure status.
pub fn run_child<H: ReflectionHost>(host: &H) -> Result<()> {
    let config = ReflectionConfig::from_env();
    let layout = config.load_layout()?;
    let mut channel = TcpChannel::connect(&config)?;
    debug!(
        "Reflecting over {} (stage {:?})",
        layout.project_root.display(),
        config.stage.active()
    );
    Reflector::new(&config, host).run(&layout, &mut channel)?;
    channel.close()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guarded_passes_values_through() {
        assert_eq!(guarded(|| Ok(7)).unwrap(), 7);
    }

    #[test]
    fn test_guarded_serializes_errors() {
        let err = guarded::<()>(|| Err(anyhow::anyhow!("bad settings"))).unwrap_err();
        assert_eq!(err.message, "bad settings");
    }

    #[test]
    fn test_guarded_catches_panics() {
        let err = guarded::<()>(|| panic!("plugin exploded")).unwrap_err();
        assert_eq!(err.name, "Panic");
        assert_eq!(err.message, "plugin exploded");
    }
}
