use appreflect_core::{PluginDescriptor, Reflection, ReflectionOutcome, SerializedError};
use std::fmt::Write;

/// Human-readable plugin list.
pub fn format_plugins(plugins: &[PluginDescriptor]) -> String {
    if plugins.is_empty() {
        return "🔌 No plugins registered".to_string();
    }

    let mut out = format!("🔌 {} plugin(s) registered:", plugins.len());
    for plugin in plugins {
        let _ = write!(out, "\n   • {} ({}", plugin.name, plugin.package_name);
        if let Some(ref version) = plugin.version {
            let _ = write!(out, " v{version}");
        }
        out.push(')');
        if let Some(ref settings) = plugin.settings {
            let _ = write!(out, "\n     settings: {settings}");
        }
    }
    out
}

/// Explain why a reflection did not succeed.
pub fn format_failure(reflection: &Reflection, verbose: bool) -> String {
    let mut out = match &reflection.outcome {
        ReflectionOutcome::Failed(error) => {
            format!(
                "❌ Reflection ({}) failed\n{}",
                reflection.stage,
                format_error(error, verbose)
            )
        }
        ReflectionOutcome::NoMessage { exit_code } => {
            let status = match exit_code {
                Some(code) => format!("exit code {code}"),
                None => "a signal".to_string(),
            };
            format!(
                "❌ Reflection ({}) ended with {status} without reporting a result",
                reflection.stage
            )
        }
        ReflectionOutcome::TimedOut => format!(
            "⏱️  Reflection ({}) timed out after {:.1}s",
            reflection.stage,
            reflection.duration.as_secs_f64()
        ),
        ReflectionOutcome::Plugins(_) | ReflectionOutcome::TypegenComplete => {
            return format!("✅ Reflection ({}) succeeded", reflection.stage);
        }
    };

    if let Some(stderr) = reflection.stderr.as_deref().map(str::trim) {
        if !stderr.is_empty() {
            out.push_str("\n\n📋 Process stderr:\n");
            out.push_str(stderr);
        }
    }
    out
}

fn format_error(error: &SerializedError, verbose: bool) -> String {
    let mut out = format!("   {}: {}", error.name, error.message);
    for cause in error.chain().skip(1) {
        let _ = write!(out, "\n   caused by {}: {}", cause.name, cause.message);
    }
    if verbose {
        if let Some(ref stack) = error.stack {
            let _ = write!(out, "\n\n🧵 Stack:\n{stack}");
        }
    }
    out
}
