// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model configuration loading.
//!
//! A [`ConfigLoader`] resolves a model identifier to three pieces of data:
//! its [`Capabilities`], its [`Ranges`] and its descriptive [`ModelInfo`].
//! Loaders read their tables once and serve every lookup from memory.
//!
//! # Loaders
//!
//! - [`StaticConfigLoader`]: Tables assembled in code
//! - [`YamlConfigLoader`]: `capabilities.yml`, `ranges.yml` and `models.yml`
//!   documents (feature `yaml`)

mod static_loader;
#[cfg(feature = "yaml")]
mod yaml;

pub use static_loader::StaticConfigLoader;
#[cfg(feature = "yaml")]
pub use yaml::YamlConfigLoader;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capabilities::Capabilities;
use crate::error::ConfigError;
use crate::types::Ranges;

/// Trait for sources of per-model configuration.
pub trait ConfigLoader: fmt::Debug + Send + Sync {
    /// Returns the capability flags of `model`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownModel` if the model is not configured.
    fn load_capabilities(&self, model: &str) -> Result<Capabilities, ConfigError>;

    /// Returns the numeric ranges of `model`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownModel` if the model is not configured.
    fn load_ranges(&self, model: &str) -> Result<Ranges, ConfigError>;

    /// Returns the descriptive metadata of `model`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownModel` if the model is not configured.
    fn load_model_info(&self, model: &str) -> Result<ModelInfo, ConfigError>;
}

/// Descriptive metadata of a power supply model.
///
/// # Examples
///
/// ```
/// use psu_lib::config::ModelInfo;
///
/// let info = ModelInfo::new("RIGOL-DP832")
///     .with_vendor("Rigol")
///     .with_channels(3);
/// assert_eq!(info.model_id, "RIGOL-DP832");
/// assert_eq!(info.channels, Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// The model identifier used as key in every table.
    pub model_id: String,
    /// Manufacturer name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Number of output channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u8>,
    /// Any other fields of the entry.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ModelInfo {
    /// Creates an entry with only a model identifier.
    #[must_use]
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            vendor: None,
            description: None,
            channels: None,
            extra: BTreeMap::new(),
        }
    }

    /// Sets the vendor.
    #[must_use]
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the channel count.
    #[must_use]
    pub fn with_channels(mut self, channels: u8) -> Self {
        self.channels = Some(channels);
        self
    }
}

/// The three configuration tables shared by the loader implementations.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConfigTables {
    pub capabilities: BTreeMap<String, Capabilities>,
    pub ranges: BTreeMap<String, Ranges>,
    pub models: Vec<ModelInfo>,
}

impl ConfigTables {
    pub fn capabilities(&self, model: &str) -> Result<Capabilities, ConfigError> {
        self.capabilities
            .get(model)
            .cloned()
            .ok_or_else(|| unknown(model, "capabilities"))
    }

    pub fn ranges(&self, model: &str) -> Result<Ranges, ConfigError> {
        self.ranges
            .get(model)
            .cloned()
            .ok_or_else(|| unknown(model, "ranges"))
    }

    pub fn model_info(&self, model: &str) -> Result<ModelInfo, ConfigError> {
        self.models
            .iter()
            .find(|entry| entry.model_id == model)
            .cloned()
            .ok_or_else(|| unknown(model, "models"))
    }

    /// Model identifiers that have both capabilities and ranges.
    pub fn model_ids(&self) -> Vec<&str> {
        self.capabilities
            .keys()
            .filter(|id| self.ranges.contains_key(*id))
            .map(String::as_str)
            .collect()
    }
}

fn unknown(model: &str, table: &'static str) -> ConfigError {
    ConfigError::UnknownModel {
        model: model.to_string(),
        table,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_info_keeps_extra_fields() {
        let info: ModelInfo = serde_json::from_str(
            r#"{"model_id": "X-1", "vendor": "Acme", "interface": ["lan"], "max_power_w": 195}"#,
        )
        .unwrap();
        assert_eq!(info.model_id, "X-1");
        assert_eq!(info.vendor.as_deref(), Some("Acme"));
        assert_eq!(info.extra["max_power_w"], 195);
        assert_eq!(info.extra["interface"][0], "lan");
    }

    #[test]
    fn tables_report_the_missing_table() {
        let tables = ConfigTables::default();
        let err = tables.ranges("X-1").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownModel { table: "ranges", .. }
        ));
        assert_eq!(err.to_string(), "model `X-1` not found in ranges");
    }

    #[test]
    fn model_ids_require_capabilities_and_ranges() {
        let mut tables = ConfigTables::default();
        tables
            .capabilities
            .insert("A".to_string(), Capabilities::programmable());
        tables.capabilities.insert("B".to_string(), Capabilities::new());
        tables.ranges.insert("A".to_string(), Ranges::new());
        assert_eq!(tables.model_ids(), ["A"]);
    }
}
