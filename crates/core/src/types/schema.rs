use serde::{Deserialize, Serialize};

/// The schema an application resolved during startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSchema {
    /// Schema definition language text.
    pub sdl: String,
    #[serde(default)]
    pub type_names: Vec<String>,
}

impl ResolvedSchema {
    pub fn new(sdl: impl Into<String>) -> Self {
        Self {
            sdl: sdl.into(),
            type_names: Vec::new(),
        }
    }

    pub fn with_type(mut self, name: impl Into<String>) -> Self {
        self.type_names.push(name.into());
        self
    }
}

/// Current schema settings of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SchemaSettings {
    pub nullable_outputs: bool,
    pub nullable_inputs: bool,
    /// Also write the SDL file next to the generated typings.
    pub generate_sdl: bool,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            nullable_outputs: false,
            nullable_inputs: true,
            generate_sdl: true,
        }
    }
}
