//! Engine configuration
//!
//! ```
//! use colormgmt_core::{ColorMgmtConfig, EngineKind};
//!
//! let config = ColorMgmtConfig::from_json(r#"{ "engine": "moxcms" }"#).unwrap();
//! assert_eq!(config.engine, EngineKind::Moxcms);
//! assert!(config.strategy.use_black_point_compensation());
//! ```

use crate::engine::ColorMgmtEngine;
use crate::structs::{ColorMgmtStrategy, ColorProfileInfo};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Lcms2,
    Moxcms,
}

/// Serializable engine setup
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorMgmtConfig {
    pub engine: EngineKind,
    pub strategy: ColorMgmtStrategy,
    /// Directories searched by [`scan_profiles`](Self::scan_profiles)
    pub profile_dirs: Vec<PathBuf>,
    pub recursive_scan: bool,
}

impl ColorMgmtConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Instantiate the configured engine with the strategy applied
    pub fn build_engine(&self) -> ColorMgmtEngine {
        let engine = match self.engine {
            EngineKind::Lcms2 => ColorMgmtEngine::lcms2(),
            EngineKind::Moxcms => ColorMgmtEngine::moxcms(),
        };
        engine.set_strategy(self.strategy);
        debug!(engine = engine.description(), strategy = ?self.strategy, "engine configured");
        engine
    }

    /// Profiles found in every configured directory, in directory order
    pub fn scan_profiles(&self, engine: &ColorMgmtEngine) -> Vec<ColorProfileInfo> {
        self.profile_dirs
            .iter()
            .flat_map(|dir| engine.available_profile_info(dir, self.recursive_scan))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{LCMS2_ENGINE_ID, MOXCMS_ENGINE_ID};
    use crate::{ColorTransformFlags, Error};

    #[test]
    fn test_defaults() {
        let config = ColorMgmtConfig::from_json("{}").unwrap();
        assert_eq!(config, ColorMgmtConfig::default());
        assert_eq!(config.engine, EngineKind::Lcms2);
        assert!(config.profile_dirs.is_empty());
        assert!(!config.recursive_scan);
    }

    #[test]
    fn test_json_round_trip() {
        let mut strategy = ColorMgmtStrategy::default();
        strategy.set_use_black_preservation(true);
        let config = ColorMgmtConfig {
            engine: EngineKind::Moxcms,
            strategy,
            profile_dirs: vec![PathBuf::from("/usr/share/color/icc")],
            recursive_scan: true,
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("\"moxcms\""));
        assert_eq!(ColorMgmtConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_build_engine_applies_strategy() {
        let config = ColorMgmtConfig::from_json(
            r#"{ "engine": "moxcms", "strategy": { "use_black_point_compensation": false } }"#,
        )
        .unwrap();
        let engine = config.build_engine();
        assert_eq!(engine.engine_id(), MOXCMS_ENGINE_ID);
        assert_eq!(engine.strategy_flags(), ColorTransformFlags::empty());

        let engine = ColorMgmtConfig::default().build_engine();
        assert_eq!(engine.engine_id(), LCMS2_ENGINE_ID);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = ColorMgmtConfig::from_json(r#"{ "engine": "skcms" }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_dirs_scan_empty() {
        let config = ColorMgmtConfig {
            profile_dirs: vec![PathBuf::from("/nonexistent/colormgmt/profiles")],
            ..Default::default()
        };
        assert!(config.scan_profiles(&config.build_engine()).is_empty());
    }
}
