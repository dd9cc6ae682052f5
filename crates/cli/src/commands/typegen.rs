use anyhow::Result;
use appreflect_core::{Layout, Reflection, ReflectionOutcome, ReflectionStage, reflect};

use super::{exit_with_failure, prepare};
use crate::cli::ReflectArgs;

pub fn typegen_command(args: &ReflectArgs) -> Result<()> {
    let prepared = prepare(args)?;
    let reflection = reflect(&prepared.layout, ReflectionStage::Typegen, &prepared.options)?;

    match typegen_summary(&reflection, &prepared.layout) {
        Some(summary) => {
            println!("{summary}");
            Ok(())
        }
        None => exit_with_failure(&reflection, args.verbose),
    }
}

/// Success line for a completed typegen run, `None` otherwise.
pub fn typegen_summary(reflection: &Reflection, layout: &Layout) -> Option<String> {
    match reflection.outcome {
        ReflectionOutcome::TypegenComplete => Some(format!(
            "✅ Generated artifacts in {} ({:.2}s)",
            layout.artifacts_path().display(),
            reflection.duration.as_secs_f64()
        )),
        ReflectionOutcome::Failed(_)
        | ReflectionOutcome::NoMessage { .. }
        | ReflectionOutcome::TimedOut
        | ReflectionOutcome::Plugins(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn reflection(outcome: ReflectionOutcome) -> Reflection {
        Reflection {
            stage: ReflectionStage::Typegen,
            outcome,
            exit_code: Some(0),
            duration: Duration::from_millis(250),
            stderr: None,
        }
    }

    #[test]
    fn test_summary_names_artifacts_dir() {
        let layout = Layout::new("/work/shop");
        let summary =
            typegen_summary(&reflection(ReflectionOutcome::TypegenComplete), &layout).unwrap();
        assert!(summary.contains("/work/shop/generated"));
        assert!(summary.contains("(0.25s)"));
    }

    #[test]
    fn test_plugin_list_is_not_a_typegen_success() {
        let layout = Layout::new("/work/shop");
        let outcome = ReflectionOutcome::Plugins(Vec::new());
        assert!(typegen_summary(&reflection(outcome), &layout).is_none());
    }
}
