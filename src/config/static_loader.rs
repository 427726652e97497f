// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory configuration loader.

use crate::capabilities::Capabilities;
use crate::config::{ConfigLoader, ConfigTables, ModelInfo};
use crate::error::ConfigError;
use crate::types::Ranges;

/// A loader whose tables are assembled in code.
///
/// # Examples
///
/// ```
/// use psu_lib::config::{ConfigLoader, StaticConfigLoader};
/// use psu_lib::types::{Range, Ranges};
/// use psu_lib::Capabilities;
///
/// let loader = StaticConfigLoader::new().with_model(
///     "LAB-1",
///     Capabilities::programmable(),
///     Ranges::new().with("voltage", Range::new(0.0, 12.0)),
/// );
///
/// assert!(loader.load_capabilities("LAB-1").is_ok());
/// assert!(loader.load_ranges("LAB-2").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticConfigLoader {
    tables: ConfigTables,
}

impl StaticConfigLoader {
    /// Creates a loader that knows no models.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the capabilities and ranges of `model`.
    ///
    /// A model registered this way has no metadata entry until
    /// [`with_model_info`](Self::with_model_info) adds one.
    #[must_use]
    pub fn with_model(
        mut self,
        model: impl Into<String>,
        capabilities: Capabilities,
        ranges: Ranges,
    ) -> Self {
        let model = model.into();
        self.tables.capabilities.insert(model.clone(), capabilities);
        self.tables.ranges.insert(model, ranges);
        self
    }

    /// Registers or replaces the metadata entry of a model.
    #[must_use]
    pub fn with_model_info(mut self, info: ModelInfo) -> Self {
        self.tables.models.retain(|m| m.model_id != info.model_id);
        self.tables.models.push(info);
        self
    }

    /// Returns the identifiers of all fully configured models.
    #[must_use]
    pub fn models(&self) -> Vec<&str> {
        self.tables.model_ids()
    }
}

impl ConfigLoader for StaticConfigLoader {
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
