//! Reflection stages and the selector that decides which one is active.

use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// The closed set of things a reflection process can be asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReflectionStage {
    /// Report the plugins the application registers.
    Plugin,
    /// Generate type artifacts from the resolved schema.
    Typegen,
}

impl ReflectionStage {
    pub const ALL: [ReflectionStage; 2] = [ReflectionStage::Plugin, ReflectionStage::Typegen];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReflectionStage::Plugin => "plugin",
            ReflectionStage::Typegen => "typegen",
        }
    }
}

impl fmt::Display for ReflectionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReflectionStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown reflection stage '{s}'"))
    }
}

/// Answers "is this the active stage?" for one process invocation.
///
/// The raw setting is parsed once; an absent or unrecognized value leaves no
/// stage active, so every query answers `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageSelector {
    raw: Option<String>,
    active: Option<ReflectionStage>,
}

impl StageSelector {
    pub fn from_setting(raw: Option<&str>) -> Self {
        let active = raw.and_then(|value| match value.parse::<ReflectionStage>() {
            Ok(stage) => Some(stage),
            Err(e) => {
                warn!("{e}; no reflection stage will run");
                None
            }
        });
        Self {
            raw: raw.map(str::to_string),
            active,
        }
    }

    pub fn fixed(stage: ReflectionStage) -> Self {
        Self {
            raw: Some(stage.as_str().to_string()),
            active: Some(stage),
        }
    }

    pub fn is_reflection_stage(&self, candidate: ReflectionStage) -> bool {
        self.active == Some(candidate)
    }

    pub fn active(&self) -> Option<ReflectionStage> {
        self.active
    }

    /// The setting as it was configured, recognized or not.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stage_names() {
        assert_eq!("plugin".parse::<ReflectionStage>(), Ok(ReflectionStage::Plugin));
        assert_eq!("TypeGen".parse::<ReflectionStage>(), Ok(ReflectionStage::Typegen));
        assert!("serve".parse::<ReflectionStage>().is_err());
    }

    #[test]
    fn test_stage_names_round_trip_through_display() {
        for stage in ReflectionStage::ALL {
            assert_eq!(stage.to_string().parse::<ReflectionStage>(), Ok(stage));
        }
        assert_eq!(" PLUGIN ".parse::<ReflectionStage>(), Ok(ReflectionStage::Plugin));
    }

    #[test]
    fn test_selector_matches_only_the_active_stage() {
        let selector = StageSelector::from_setting(Some("typegen"));
        assert!(selector.is_reflection_stage(ReflectionStage::Typegen));
        assert!(!selector.is_reflection_stage(ReflectionStage::Plugin));
        // Same answer on every call.
        assert!(selector.is_reflection_stage(ReflectionStage::Typegen));
    }

    #[test]
    fn test_unknown_stage_matches_nothing() {
        let selector = StageSelector::from_setting(Some("deploy"));
        for stage in ReflectionStage::ALL {
            assert!(!selector.is_reflection_stage(stage));
        }
        assert_eq!(selector.raw(), Some("deploy"));
        assert_eq!(selector.active(), None);
    }

    #[test]
    fn test_absent_stage_matches_nothing() {
        let selector = StageSelector::from_setting(None);
        assert_eq!(selector.active(), None);
        assert!(!selector.is_reflection_stage(ReflectionStage::Plugin));
    }
}
