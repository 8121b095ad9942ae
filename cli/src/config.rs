#![deny(missing_docs)]

//! # Tool Configuration
//!
//! Settings come from three layers, strongest first:
//!
//! 1. Command line flags (or their `THAUM_*` environment variables).
//! 2. `thaum.yaml` in the working directory, or the file given with `--config`.
//! 3. Built-in defaults: `generate.yaml`, the current directory, target `thaum`.

use crate::error::{CliError, CliResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thaum_core::GenerationTarget;
use tracing::debug;

/// Configuration file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "thaum.yaml";
/// Schema document used when nothing else names one.
pub const DEFAULT_SCHEMA_FILE: &str = "generate.yaml";

/// Contents of `thaum.yaml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Which halves to emit.
    pub target: Option<GenerationTarget>,
    /// Directory receiving `generated.dart`.
    pub output_dir: Option<PathBuf>,
    /// Schema document path.
    pub schema: Option<PathBuf>,
}

/// Fully resolved settings of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Which halves to emit.
    pub target: GenerationTarget,
    /// Directory receiving the artifact.
    pub output_dir: PathBuf,
    /// Schema document path.
    pub schema: PathBuf,
}

impl ToolConfig {
    /// Parses configuration YAML.
    pub fn from_yaml(yaml: &str) -> CliResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Loads the configuration.
    ///
    /// # Arguments
    ///
    /// * `explicit` - A path given with `--config`; it must exist.
    ///
    /// Without an explicit path, a missing `thaum.yaml` yields the empty configuration.
    pub fn load(explicit: Option<&Path>) -> CliResult<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let yaml = fs::read_to_string(&path)
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_yaml(&yaml)?;
        debug!(path = %path.display(), ?config, "loaded tool configuration");
        Ok(config)
    }

    /// Layers `overrides` on top of this configuration and fills in defaults.
    pub fn resolve(self, overrides: ToolConfig) -> Settings {
        Settings {
            target: overrides.target.or(self.target).unwrap_or_default(),
            output_dir: overrides
                .output_dir
                .or(self.output_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            schema: overrides
                .schema
                .or(self.schema)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCHEMA_FILE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_flags_override_file_and_defaults() {
        let file = ToolConfig::from_yaml("target: server\noutput_dir: out\n").unwrap();
        let settings = file.resolve(ToolConfig {
            output_dir: Some(PathBuf::from("lib")),
            ..ToolConfig::default()
        });
        assert_eq!(
            settings,
            Settings {
                target: GenerationTarget::Server,
                output_dir: PathBuf::from("lib"),
                schema: PathBuf::from(DEFAULT_SCHEMA_FILE),
            }
        );
    }

    #[test]
    fn test_defaults() {
        let settings = ToolConfig::default().resolve(ToolConfig::default());
        assert_eq!(settings.target, GenerationTarget::Thaum);
        assert_eq!(settings.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = ToolConfig::from_yaml("targt: server\n").unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(
            ToolConfig::load(Some(&missing)),
            Err(CliError::Config(_))
        ));

        let present = dir.path().join("thaum.yaml");
        fs::write(&present, "schema: api/generate.yaml\n").unwrap();
        let config = ToolConfig::load(Some(&present)).unwrap();
        assert_eq!(config.schema, Some(PathBuf::from("api/generate.yaml")));
    }
}
