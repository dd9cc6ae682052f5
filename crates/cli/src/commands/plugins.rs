use anyhow::Result;
use appreflect_core::{Reflection, ReflectionOutcome, ReflectionStage, reflect};
use tracing::debug;

use super::{exit_with_failure, prepare};
use crate::cli::ReflectArgs;
use crate::display::format_plugins;

pub fn plugins_command(args: &ReflectArgs, json: bool) -> Result<()> {
    let prepared = prepare(args)?;
    let reflection = reflect(&prepared.layout, ReflectionStage::Plugin, &prepared.options)?;
    debug!("Plugin reflection took {:?}", reflection.duration);

    match render_plugins(&reflection, json)? {
        Some(output) => {
            println!("{output}");
            Ok(())
        }
        None => exit_with_failure(&reflection, args.verbose),
    }
}

/// The plugin listing, or `None` when the reflection did not produce one.
pub fn render_plugins(reflection: &Reflection, json: bool) -> Result<Option<String>> {
    match &reflection.outcome {
        ReflectionOutcome::Plugins(plugins) if json => {
            Ok(Some(serde_json::to_string_pretty(plugins)?))
        }
        ReflectionOutcome::Plugins(plugins) => Ok(Some(format_plugins(plugins))),
        ReflectionOutcome::Failed(_)
        | ReflectionOutcome::NoMessage { .. }
        | ReflectionOutcome::TimedOut
        | ReflectionOutcome::TypegenComplete => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appreflect_core::PluginDescriptor;
    use std::time::Duration;

    fn reflection(outcome: ReflectionOutcome) -> Reflection {
        Reflection {
            stage: ReflectionStage::Plugin,
            outcome,
            exit_code: Some(0),
            duration: Duration::from_millis(40),
            stderr: None,
        }
    }

    #[test]
    fn test_renders_plugins_as_json() {
        let plugins = vec![PluginDescriptor::new("auth", "shop-auth")];
        let output = render_plugins(&reflection(ReflectionOutcome::Plugins(plugins)), true)
            .unwrap()
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["package_name"], "shop-auth");
    }

    #[test]
    fn test_only_a_plugin_list_counts_as_success() {
        for outcome in [
            ReflectionOutcome::TypegenComplete,
            ReflectionOutcome::TimedOut,
            ReflectionOutcome::NoMessage { exit_code: Some(0) },
        ] {
            assert!(render_plugins(&reflection(outcome), false).unwrap().is_none());
        }
    }
}
