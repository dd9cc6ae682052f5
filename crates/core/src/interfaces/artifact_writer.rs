use crate::{
    layout::Layout,
    types::{ResolvedSchema, RuntimePlugin, SchemaSettings},
};

/// Everything needed to generate type artifacts.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactRequest<'a> {
    pub schema: &'a ResolvedSchema,
    pub layout: &'a Layout,
    pub schema_settings: &'a SchemaSettings,
    pub plugins: &'a [RuntimePlugin],
}

/// Turns a resolved schema into files on disk.
pub trait ArtifactWriter {
    fn write_artifacts(&self, request: ArtifactRequest<'_>) -> anyhow::Result<()>;
}
