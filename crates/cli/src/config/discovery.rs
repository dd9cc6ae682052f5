use anyhow::{Context, Result};
use appreflect_core::Layout;
use std::{fs, path::Path};
use tracing::debug;
use walkdir::WalkDir;

/// Directory under `src/` whose modules make up the schema.
pub const SCHEMA_DIR: &str = "schema";

/// Build a layout by inspecting the project on disk.
pub fn discover_layout(project_root: &Path) -> Result<Layout> {
    let mut layout = Layout::new(project_root);

    let cargo_toml = project_root.join("Cargo.toml");
    if cargo_toml.exists() {
        if let Some(name) = package_name(&cargo_toml)? {
            layout = layout.with_package_name(name);
        }
    }

    for entry in ["main.rs", "lib.rs"] {
        let candidate = layout.source_root.join(entry);
        if candidate.is_file() {
            layout = layout.with_app_entry(candidate);
            break;
        }
    }

    let schema_dir = layout.source_root.join(SCHEMA_DIR);
    if schema_dir.is_dir() {
        let mut modules: Vec<_> = WalkDir::new(&schema_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "rs"))
            .collect();
        modules.sort();
        layout.schema_modules = modules;
    }

    debug!(
        "Discovered layout for {}: package={:?}, entry={:?}, {} schema modules",
        project_root.display(),
        layout.package_name,
        layout.app_entry,
        layout.schema_modules.len()
    );
    Ok(layout)
}

/// Package name from a manifest; `None` for a virtual workspace manifest.
pub fn package_name(cargo_toml: &Path) -> Result<Option<String>> {
    let contents = fs::read_to_string(cargo_toml)
        .with_context(|| format!("Failed to read {}", cargo_toml.display()))?;
    let manifest = cargo_toml::Manifest::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", cargo_toml.display()))?;
    Ok(manifest.package.map(|package| package.name))
}
