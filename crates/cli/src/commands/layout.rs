use anyhow::Result;
use appreflect_core::Settings;
use std::path::Path;

use crate::config::discover_layout;
use crate::utils::resolve_project_root;

pub fn layout_command(project_root: Option<&Path>, artifacts_dir: Option<&Path>) -> Result<()> {
    let project_root = resolve_project_root(project_root)?;
    let settings = Settings::discover(&project_root)?;

    let mut layout = discover_layout(&project_root)?;
    if let Some(dir) = artifacts_dir.or(settings.artifacts_dir.as_deref()) {
        layout = layout.with_artifacts_dir(dir);
    }
    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}
