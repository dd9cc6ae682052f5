//! Default artifact writer: SDL plus a JSON typegen manifest.

use crate::interfaces::{ArtifactRequest, ArtifactWriter};
use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const SDL_FILE: &str = "schema.graphql";
pub const TYPEGEN_FILE: &str = "typegen.json";

/// Writes generated artifacts into the layout's artifacts directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactWriter;

#[derive(Serialize)]
struct TypegenManifest<'a> {
    package_name: Option<&'a str>,
    type_names: &'a [String],
    nullable_outputs: bool,
    nullable_inputs: bool,
    plugins: Vec<TypegenPlugin<'a>>,
}

#[derive(Serialize)]
struct TypegenPlugin<'a> {
    name: &'a str,
    package_name: &'a str,
    imports: &'a [String],
}

impl ArtifactWriter for FsArtifactWriter {
    fn write_artifacts(&self, request: ArtifactRequest<'_>) -> anyhow::Result<()> {
        let out_dir = request.layout.artifacts_path();
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;

        if request.schema_settings.generate_sdl {
            write_file(&out_dir.join(SDL_FILE), request.schema.sdl.as_bytes())?;
        }

        let manifest = TypegenManifest {
            package_name: request.layout.package_name.as_deref(),
            type_names: &request.schema.type_names,
            nullable_outputs: request.schema_settings.nullable_outputs,
            nullable_inputs: request.schema_settings.nullable_inputs,
            plugins: request
                .plugins
                .iter()
                .map(|plugin| TypegenPlugin {
                    name: &plugin.descriptor.name,
                    package_name: &plugin.descriptor.package_name,
                    imports: &plugin.typegen_imports,
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&manifest)?;
        write_file(&out_dir.join(TYPEGEN_FILE), json.as_bytes())?;

        debug!("Wrote artifacts to {}", out_dir.display());
        Ok(())
    }
}

fn write_file(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
