// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::series::MAX_POINTS;

/// Environment variable naming the YAML config file.
pub const CONFIG_ENV_VAR: &str = "DD_TIMELINE_CONFIG";

fn default_true() -> bool {
    true
}

fn default_max_points() -> usize {
    MAX_POINTS
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub merger: MergerConfig,
    pub objects: ObjectsConfig,
    pub spans: SpansConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergerConfig {
    /// Upper bound on points visited per source during a merge.
    #[serde(default = "default_max_points")]
    pub max_points: usize,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            max_points: MAX_POINTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectsConfig {
    /// Close still-alive instances at the end of the trace.
    #[serde(default = "default_true")]
    pub auto_delete: bool,
}

impl Default for ObjectsConfig {
    fn default() -> Self {
        Self { auto_delete: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpansConfig {
    /// Close spans still open at the end of the trace.
    #[serde(default = "default_true")]
    pub auto_close: bool,
}

impl Default for SpansConfig {
    fn default() -> Self {
        Self { auto_close: true }
    }
}

impl Config {
    /// Config file path from `DD_TIMELINE_CONFIG`, if set and non-empty.
    pub fn path_from_env() -> Option<PathBuf> {
        std::env::var_os(CONFIG_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    pub fn from_yaml_str(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        // An empty document means "all defaults".
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml_str(&contents, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Loads `explicit` if given, else the file named by the environment,
    /// else the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit.map(Path::to_path_buf).or_else(Self::path_from_env) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.merger.max_points == 0 {
            return Err(ConfigError::Invalid("merger.max_points must be greater than 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.merger.max_points, 1000);
        assert!(config.objects.auto_delete);
        assert!(config.spans.auto_close);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_yaml_str("", "inline").unwrap(), Config::default());
        assert_eq!(Config::from_yaml_str("  \n", "inline").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_document() {
        let config = Config::from_yaml_str("merger:\n  max_points: 50\n", "inline").unwrap();
        assert_eq!(config.merger.max_points, 50);
        assert!(config.objects.auto_delete);

        let config = Config::from_yaml_str("objects:\n  auto_delete: false\n", "inline").unwrap();
        assert_eq!(config.merger.max_points, MAX_POINTS);
        assert!(!config.objects.auto_delete);
    }

    #[test]
    fn test_zero_max_points_rejected() {
        let err = Config::from_yaml_str("merger:\n  max_points: 0\n", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Config::from_yaml_str("merger:\n  max_pionts: 5\n", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
