pub mod layout;
pub mod plugins;
pub mod typegen;

pub use layout::layout_command;
pub use plugins::plugins_command;
pub use typegen::typegen_command;

use anyhow::{Context, Result, bail};
use appreflect_core::{ChildCommand, Layout, ReflectOptions, Reflection, Settings};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::cli::ReflectArgs;
use crate::config::discover_layout;
use crate::display::format_failure;
use crate::utils::{resolve_against, resolve_project_root};

/// Everything needed to start one reflection process.
#[derive(Debug)]
pub struct Prepared {
    pub layout: Layout,
    pub options: ReflectOptions,
}

/// Merge CLI flags over `.appreflect.json` and resolve the layout.
pub fn prepare(args: &ReflectArgs) -> Result<Prepared> {
    let project_root = resolve_project_root(args.project_root.as_deref())?;
    let settings = Settings::discover(&project_root)?;
    debug!("Using settings: {:?}", settings);

    let artifacts_dir = args
        .artifacts_dir
        .as_deref()
        .or(settings.artifacts_dir.as_deref());
    let layout = load_layout(&project_root, args.layout.as_deref(), artifacts_dir)?;

    let Some(executable) = args.executable.as_ref().or(settings.executable.as_ref()) else {
        bail!(
            "No reflection executable given. Pass one as an argument or set `executable` in .appreflect.json"
        );
    };
    let executable = resolve_against(&project_root, executable);

    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| settings.timeout());
    let capture_stderr = !args.no_capture && settings.capture_stderr.unwrap_or(true);

    let mut env: Vec<_> = settings.env.into_iter().collect();
    env.sort();
    env.extend(args.env.iter().cloned());

    let mut command = ChildCommand::new(executable)
        .with_args(settings.args)
        .with_working_dir(&project_root);
    for (key, value) in env {
        command = command.with_env(key, value);
    }

    Ok(Prepared {
        layout,
        options: ReflectOptions::new(command)
            .with_timeout(timeout)
            .with_capture_stderr(capture_stderr),
    })
}

fn load_layout(
    project_root: &Path,
    layout_file: Option<&Path>,
    artifacts_dir: Option<&Path>,
) -> Result<Layout> {
    let mut layout = match layout_file {
        Some(path) => {
            let path = resolve_against(project_root, path);
            Layout::load_from_file(&path)
                .with_context(|| format!("Failed to load layout from {}", path.display()))?
        }
        None => discover_layout(project_root)?,
    };
    if let Some(dir) = artifacts_dir {
        layout = layout.with_artifacts_dir(dir);
    }
    Ok(layout)
}

/// Report a non-successful reflection and exit with status 1.
fn exit_with_failure(reflection: &Reflection, verbose: bool) -> ! {
    eprintln!("{}", format_failure(reflection, verbose));
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(".appreflect.json"),
            r#"{
                "executable": "target/debug/shop-reflect",
                "args": ["--quiet"],
                "env": {"B": "2", "A": "1"},
                "timeout_secs": 30,
                "capture_stderr": false,
                "artifacts_dir": "gen"
            }"#,
        )
        .unwrap();
        temp_dir
    }

    #[test]
    fn test_settings_fill_in_missing_flags() {
        let temp_dir = project();
        let root = temp_dir.path().canonicalize().unwrap();
        let prepared = prepare(&ReflectArgs {
            project_root: Some(root.clone()),
            ..Default::default()
        })
        .unwrap();

        let command = &prepared.options.command;
        assert_eq!(command.program, root.join("target/debug/shop-reflect"));
        assert_eq!(command.args, vec!["--quiet".to_string()]);
        assert_eq!(command.working_dir, Some(root.clone()));
        assert_eq!(
            command.env,
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "2".to_string()),
            ]
        );
        assert_eq!(prepared.options.timeout, Duration::from_secs(30));
        assert!(!prepared.options.capture_stderr);
        assert_eq!(prepared.layout.artifacts_dir, PathBuf::from("gen"));
        assert_eq!(prepared.layout.project_root, root);
    }

    #[test]
    fn test_flags_override_settings() {
        let temp_dir = project();
        let prepared = prepare(&ReflectArgs {
            executable: Some(PathBuf::from("/opt/reflect")),
            project_root: Some(temp_dir.path().to_path_buf()),
            artifacts_dir: Some(PathBuf::from("out")),
            timeout: Some(3),
            env: vec![("A".to_string(), "override".to_string())],
            ..Default::default()
        })
        .unwrap();

        let command = &prepared.options.command;
        assert_eq!(command.program, PathBuf::from("/opt/reflect"));
        // Flag env comes last so it wins when applied in order.
        assert_eq!(
            command.env.last(),
            Some(&("A".to_string(), "override".to_string()))
        );
        assert_eq!(prepared.options.timeout, Duration::from_secs(3));
        assert_eq!(prepared.layout.artifacts_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_missing_executable_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = prepare(&ReflectArgs {
            project_root: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("No reflection executable"));
    }

    #[test]
    fn test_layout_file_replaces_discovery() {
        let temp_dir = TempDir::new().unwrap();
        let layout = Layout::new("/srv/shop").with_package_name("from-file");
        fs::write(temp_dir.path().join("layout.json"), layout.to_json().unwrap()).unwrap();

        let prepared = prepare(&ReflectArgs {
            executable: Some(PathBuf::from("/opt/reflect")),
            project_root: Some(temp_dir.path().to_path_buf()),
            layout: Some(PathBuf::from("layout.json")),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(prepared.layout, layout);
    }
}
