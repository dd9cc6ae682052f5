use crate::{
    error::{Error, Result},
    layout::Layout,
    stage::{ReflectionStage, StageSelector},
};

/// Serialized layout descriptor handed to the reflection process.
pub const LAYOUT_ENV: &str = "APPREFLECT_LAYOUT";
/// Name of the active reflection stage.
pub const STAGE_ENV: &str = "APPREFLECT_REFLECTION_STAGE";
/// `host:port` of the parent's channel listener.
pub const CHANNEL_ENV: &str = "APPREFLECT_CHANNEL";
/// Token the child presents when it connects to the channel.
pub const CHANNEL_TOKEN_ENV: &str = "APPREFLECT_CHANNEL_TOKEN";

/// Process-level configuration of one reflection invocation.
///
/// Built once at process entry and passed down; nothing below this reads the
/// environment itself.
#[derive(Debug, Clone, Default)]
pub struct ReflectionConfig {
    pub layout: Option<String>,
    pub stage: StageSelector,
    pub channel: Option<String>,
    pub channel_token: Option<String>,
}

impl ReflectionConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let stage = lookup(STAGE_ENV);
        Self {
            layout: lookup(LAYOUT_ENV),
            stage: StageSelector::from_setting(stage.as_deref()),
            channel: lookup(CHANNEL_ENV),
            channel_token: lookup(CHANNEL_TOKEN_ENV),
        }
    }

    pub fn is_reflection_stage(&self, candidate: ReflectionStage) -> bool {
        self.stage.is_reflection_stage(candidate)
    }

    /// Require and parse the layout descriptor.
    pub fn load_layout(&self) -> Result<Layout> {
        let raw = self
            .layout
            .as_deref()
            .ok_or_else(|| Error::LayoutMissing(LAYOUT_ENV.to_string()))?;
        Layout::from_json(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_reads_all_settings() {
        let layout = Layout::new("/p").to_json().unwrap();
        let config = ReflectionConfig::from_lookup(lookup_from(&[
            (LAYOUT_ENV, &layout),
            (STAGE_ENV, "plugin"),
            (CHANNEL_ENV, "127.0.0.1:4000"),
            (CHANNEL_TOKEN_ENV, "abc"),
        ]));

        assert!(config.is_reflection_stage(ReflectionStage::Plugin));
        assert_eq!(config.channel.as_deref(), Some("127.0.0.1:4000"));
        assert_eq!(config.channel_token.as_deref(), Some("abc"));
        assert_eq!(config.load_layout().unwrap(), Layout::new("/p"));
    }

    #[test]
    fn test_missing_layout_is_fatal() {
        let config = ReflectionConfig::from_lookup(lookup_from(&[(STAGE_ENV, "plugin")]));
        let err = config.load_layout().unwrap_err();
        assert!(matches!(err, Error::LayoutMissing(ref name) if name == LAYOUT_ENV));
    }

    #[test]
    fn test_garbage_layout_is_fatal() {
        let config = ReflectionConfig::from_lookup(lookup_from(&[(LAYOUT_ENV, "[1,2")]));
        assert!(matches!(config.load_layout(), Err(Error::LayoutInvalid(_))));
    }
}
