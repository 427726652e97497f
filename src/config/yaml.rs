// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! YAML-backed configuration loader.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::capabilities::Capabilities;
use crate::config::{ConfigLoader, ConfigTables, ModelInfo};
use crate::error::ConfigError;
use crate::types::Ranges;

const BUNDLED_CAPABILITIES: &str = include_str!("../../config/capabilities.yml");
const BUNDLED_RANGES: &str = include_str!("../../config/ranges.yml");
const BUNDLED_MODELS: &str = include_str!("../../config/models.yml");

/// Loads model configuration from three YAML documents.
///
/// | File | Shape |
/// |------|-------|
/// | `capabilities.yml` | model → { capability → bool } |
/// | `ranges.yml` | model → { parameter → { min?, max?, unit? } } |
/// | `models.yml` | list of entries with a `model_id` |
///
/// All documents are parsed when the loader is created; lookups never touch
/// the filesystem.
///
/// # Examples
///
/// ```
/// use psu_lib::config::{ConfigLoader, YamlConfigLoader};
/// use psu_lib::Capability;
///
/// let loader = YamlConfigLoader::bundled().unwrap();
/// let caps = loader.load_capabilities("RIGOL-DP832").unwrap();
/// assert!(caps.supports(Capability::SetVoltage));
/// ```
#[derive(Debug, Clone)]
pub struct YamlConfigLoader {
    source: Option<PathBuf>,
    tables: ConfigTables,
}

impl YamlConfigLoader {
    /// Capabilities document name.
    pub const CAPABILITIES_FILE: &'static str = "capabilities.yml";
    /// Ranges document name.
    pub const RANGES_FILE: &'static str = "ranges.yml";
    /// Model metadata document name.
    pub const MODELS_FILE: &'static str = "models.yml";

    /// Loads the three documents from `dir`.
    ///
    /// `models.yml` may be absent, in which case no model has metadata.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if a required file cannot be read and
    /// `ConfigError::Yaml` if a document has the wrong shape.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let capabilities = read(&dir.join(Self::CAPABILITIES_FILE))?;
        let ranges = read(&dir.join(Self::RANGES_FILE))?;
        let models_path = dir.join(Self::MODELS_FILE);
        let models = match fs::read_to_string(&models_path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: models_path.display().to_string(),
                    source,
                });
            }
        };

        let mut loader = Self::from_strs(&capabilities, &ranges, &models)?;
        tracing::debug!(
            dir = %dir.display(),
            models = loader.tables.model_ids().len(),
            "Loaded PSU configuration"
        );
        loader.source = Some(dir.to_path_buf());
        Ok(loader)
    }

    /// Parses the three documents from memory.
    ///
    /// Empty documents are treated as empty tables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Yaml` if a document has the wrong shape.
    pub fn from_strs(capabilities: &str, ranges: &str, models: &str) -> Result<Self, ConfigError> {
        let tables = ConfigTables {
            capabilities: parse::<BTreeMap<String, Capabilities>>(
                Self::CAPABILITIES_FILE,
                capabilities,
            )?,
            ranges: parse::<BTreeMap<String, Ranges>>(Self::RANGES_FILE, ranges)?,
            models: parse::<Vec<ModelInfo>>(Self::MODELS_FILE, models)?,
        };
        Ok(Self {
            source: None,
            tables,
        })
    }

    /// Loads the tables shipped with the crate.
    ///
    /// Bundled models: `RIGOL-DP832`, `KEYSIGHT-E36312A` and `GENERIC-FIXED-5V`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Yaml` if the bundled documents fail to parse.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_strs(BUNDLED_CAPABILITIES, BUNDLED_RANGES, BUNDLED_MODELS)
    }

    /// Returns the directory the documents were read from, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Returns the identifiers of all models with capabilities and ranges.
    #[must_use]
    pub fn models(&self) -> Vec<&str> {
        self.tables.model_ids()
    }
}

impl ConfigLoader for YamlConfigLoader {
    fn load_capabilities(&self, model: &str) -> Result<Capabilities, ConfigError> {
        self.tables.capabilities(model)
    }

    fn load_ranges(&self, model: &str) -> Result<Ranges, ConfigError> {
        self.tables.ranges(model)
    }

    fn load_model_info(&self, model: &str) -> Result<ModelInfo, ConfigError> {
        self.tables.model_info(model)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn parse<T: DeserializeOwned + Default>(document: &str, text: &str) -> Result<T, ConfigError> {
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str::<Option<T>>(text)
        .map(Option::unwrap_or_default)
        .map_err(|source| ConfigError::Yaml {
            document: document.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Capability;
    use crate::types::Range;

    #[test]
    fn bundled_tables_parse() {
        let loader = YamlConfigLoader::bundled().unwrap();
        assert_eq!(
            loader.models(),
            ["GENERIC-FIXED-5V", "KEYSIGHT-E36312A", "RIGOL-DP832"]
        );
        assert!(loader.source().is_none());
    }

    #[test]
    fn bundled_dp832() {
        let loader = YamlConfigLoader::bundled().unwrap();
        let caps = loader.load_capabilities("RIGOL-DP832").unwrap();
        assert!(Capability::ALL.into_iter().all(|c| caps.supports(c)));
        assert_eq!(caps.get("remote_sense"), Some(false));

        let ranges = loader.load_ranges("RIGOL-DP832").unwrap();
        assert_eq!(
            ranges.get("voltage"),
            Some(&Range::new(0.0, 30.0).with_unit("V"))
        );

        let info = loader.load_model_info("RIGOL-DP832").unwrap();
        assert_eq!(info.vendor.as_deref(), Some("Rigol"));
        assert_eq!(info.channels, Some(3));
        assert_eq!(info.extra["interface"][1], "lan");
    }

    #[test]
    fn bundled_fixed_supply_has_no_voltage_control() {
        let loader = YamlConfigLoader::bundled().unwrap();
        let caps = loader.load_capabilities("GENERIC-FIXED-5V").unwrap();
        assert!(!caps.supports(Capability::SetVoltage));
        assert!(caps.supports(Capability::ToggleOutput));
        let ranges = loader.load_ranges("GENERIC-FIXED-5V").unwrap();
        assert_eq!(ranges.get("current").and_then(|r| r.min), None);
    }

    #[test]
    fn empty_documents_are_empty_tables() {
        let loader = YamlConfigLoader::from_strs("", "\n", "# nothing\n").unwrap();
        assert!(loader.models().is_empty());
        assert!(loader.load_model_info("X").is_err());
    }

    #[test]
    fn wrong_shape_is_yaml_error() {
        let err = YamlConfigLoader::from_strs("- a\n- b\n", "", "").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { ref document, .. } if document == "capabilities.yml"));
    }

    #[test]
    fn from_missing_dir_is_io_error() {
        let err = YamlConfigLoader::from_dir("/nonexistent/psu/config").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
