//! Engine configuration, loadable from YAML or JSON.
//!
//! Every section falls back to the built-in MiniZinc defaults, so a file only
//! needs to spell out what it changes:
//!
//! ```yaml
//! features:
//!   level: 4
//!   disable: [operator]
//! indent:
//!   unit: 4
//! session:
//!   solver: gecode
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

use crate::highlight::{self, FeatureSet};
use crate::ide::SessionConfig;
use crate::indent::{self, IndentRule};
use crate::query::QueryRule;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config file extension: {0:?}")]
    UnsupportedExtension(Option<String>),
}

/// Everything an [`EngineHost`](crate::ide::EngineHost) is built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Registry name of the grammar the rules are written against.
    pub language: SmolStr,
    pub highlight: Vec<QueryRule>,
    pub features: FeatureConfig,
    pub indent: IndentConfig,
    pub session: SessionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            language: SmolStr::new_static(crate::syntax::LANGUAGE),
            highlight: highlight::minizinc_rules(),
            features: FeatureConfig::default(),
            indent: IndentConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load a config file, choosing the format from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str,
            Some("json") => Self::from_json_str,
            _ => return Err(ConfigError::UnsupportedExtension(extension)),
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Feature levels plus explicit additions and removals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub levels: Vec<Vec<SmolStr>>,
    pub level: usize,
    pub enable: Vec<SmolStr>,
    pub disable: Vec<SmolStr>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        let defaults = FeatureSet::minizinc();
        Self {
            levels: defaults.levels().to_vec(),
            level: defaults.level(),
            enable: Vec::new(),
            disable: Vec::new(),
        }
    }
}

impl FeatureConfig {
    pub fn to_feature_set(&self) -> FeatureSet {
        let mut features = FeatureSet::new(self.levels.clone(), self.level);
        for feature in &self.enable {
            features.enable(feature.clone());
        }
        for feature in &self.disable {
            features.disable(feature.clone());
        }
        features
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndentConfig {
    /// Columns per indent unit.
    pub unit: u32,
    pub rules: Vec<IndentRule>,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            unit: indent::DEFAULT_UNIT,
            rules: indent::minizinc_rules(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = EngineConfig::from_yaml_str(
            "features:\n  level: 4\n  disable: [operator]\nindent:\n  unit: 4\n",
        )
        .unwrap();

        assert_eq!(config.language, "minizinc");
        assert_eq!(config.highlight, highlight::minizinc_rules());
        assert_eq!(config.indent.unit, 4);
        assert_eq!(config.indent.rules, indent::minizinc_rules());

        let features = config.features.to_feature_set();
        assert!(features.is_enabled("variable"));
        assert!(!features.is_enabled("operator"));
    }

    #[test]
    fn test_json_rules() {
        let config = EngineConfig::from_json_str(
            r#"{"highlight": [
                {"feature": "comment", "override": true, "query": "(line_comment) @comment"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            config.highlight,
            vec![QueryRule::new("comment", "(line_comment) @comment").overriding()]
        );
    }

    #[test]
    fn test_yaml_round_trip_of_defaults() {
        let config = EngineConfig::default();
        let text = config.to_yaml().unwrap();
        assert_eq!(EngineConfig::from_yaml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = EngineConfig::from_path("engine.toml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedExtension(Some(ext)) if ext == "toml"));
    }
}
