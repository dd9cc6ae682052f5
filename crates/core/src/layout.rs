use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Description of the target project's file and module structure.
///
/// Built once by the parent and handed to the reflection process as JSON.
/// The reflection machinery never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Layout {
    pub project_root: PathBuf,
    pub source_root: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    /// Module that exports the application, if one was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_entry: Option<PathBuf>,
    #[serde(default)]
    pub schema_modules: Vec<PathBuf>,
    /// Where generated artifacts land; relative paths are under `project_root`.
    pub artifacts_dir: PathBuf,
}

impl Layout {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            source_root: project_root.join("src"),
            project_root,
            package_name: None,
            app_entry: None,
            schema_modules: Vec::new(),
            artifacts_dir: PathBuf::from("generated"),
        }
    }

    pub fn with_package_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = Some(name.into());
        self
    }

    pub fn with_app_entry(mut self, entry: impl Into<PathBuf>) -> Self {
        self.app_entry = Some(entry.into());
        self
    }

    pub fn with_schema_module(mut self, module: impl Into<PathBuf>) -> Self {
        self.schema_modules.push(module.into());
        self
    }

    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    /// Parse and validate a serialized layout descriptor.
    pub fn from_json(json: &str) -> Result<Self> {
        let layout: Layout = serde_json::from_str(json)
            .map_err(|e| Error::LayoutInvalid(format!("Failed to parse layout: {e}")))?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::LayoutInvalid(format!("Failed to serialize layout: {e}")))
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.project_root.as_os_str().is_empty() {
            return Err(Error::LayoutInvalid("project_root is empty".to_string()));
        }
        if self.artifacts_dir.as_os_str().is_empty() {
            return Err(Error::LayoutInvalid("artifacts_dir is empty".to_string()));
        }
        Ok(())
    }

    pub fn artifacts_path(&self) -> PathBuf {
        if self.artifacts_dir.is_absolute() {
            self.artifacts_dir.clone()
        } else {
            self.project_root.join(&self.artifacts_dir)
        }
    }
}
