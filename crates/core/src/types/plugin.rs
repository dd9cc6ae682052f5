use serde::{Deserialize, Serialize};

/// A plugin as the application registered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub name: String,
    /// Package the plugin is imported from.
    pub package_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Settings passed to the plugin at registration time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Value>,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package_name: package_name.into(),
            version: None,
            settings: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_settings(mut self, settings: serde_json::Value) -> Self {
        self.settings = Some(settings);
        self
    }
}

/// A plugin after its runtime half has been imported and loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimePlugin {
    pub descriptor: PluginDescriptor,
    /// Imports the plugin contributes to generated typings.
    #[serde(default)]
    pub typegen_imports: Vec<String>,
}

impl RuntimePlugin {
    pub fn new(descriptor: PluginDescriptor) -> Self {
        Self {
            descriptor,
            typegen_imports: Vec::new(),
        }
    }

    pub fn with_typegen_import(mut self, import: impl Into<String>) -> Self {
        self.typegen_imports.push(import.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}
