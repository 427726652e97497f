// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Runtime-configured device builder.

use std::sync::Arc;

use crate::adapter::Adapter;
use crate::config::ConfigLoader;
use crate::device::Psu;
use crate::error::{Error, Result};
use crate::strategy::{PsuStrategy, StrategyKind};

/// A device with boxed adapter and strategy.
pub type DynPsu = Psu<Box<dyn Adapter>, Box<dyn PsuStrategy>>;

/// Builder for devices whose parts are picked at runtime.
///
/// Adapter and loader are required. The strategy defaults to
/// [`StrategyKind::Virtual`].
///
/// # Examples
///
/// ```
/// use psu_lib::adapter::SimAdapter;
/// use psu_lib::config::YamlConfigLoader;
/// use psu_lib::strategy::StrategyKind;
/// use psu_lib::Psu;
///
/// # fn main() -> psu_lib::Result<()> {
/// let psu = Psu::builder("KEYSIGHT-E36312A")
///     .with_adapter(SimAdapter::new())
///     .with_loader(YamlConfigLoader::bundled()?)
///     .with_strategy_kind(StrategyKind::Real)
///     .build()?;
/// assert_eq!(psu.model(), "KEYSIGHT-E36312A");
///
/// // Missing parts are reported, not defaulted.
/// assert!(Psu::builder("KEYSIGHT-E36312A").build().is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct PsuBuilder {
    model: String,
    adapter: Option<Box<dyn Adapter>>,
    loader: Option<Arc<dyn ConfigLoader>>,
    strategy: Option<Box<dyn PsuStrategy>>,
}

impl PsuBuilder {
    /// Creates a builder for `model`.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Sets the transport.
    #[must_use]
    pub fn with_adapter(mut self, adapter: impl Adapter + 'static) -> Self {
        self.adapter = Some(Box::new(adapter));
        self
    }

    /// Sets the configuration loader.
    #[must_use]
    pub fn with_loader(mut self, loader: impl ConfigLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Sets a configuration loader that is shared with other devices.
    #[must_use]
    pub fn with_shared_loader(mut self, loader: Arc<dyn ConfigLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Sets the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl PsuStrategy + 'static) -> Self {
        self.strategy = Some(Box::new(strategy));
        self
    }

    /// Sets the strategy by kind, with default settings.
    #[must_use]
    pub fn with_strategy_kind(mut self, kind: StrategyKind) -> Self {
        self.strategy = Some(kind.into_strategy());
        self
    }

    /// Builds the device.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the model is blank or the adapter or
    /// loader is missing, and `Error::Config` if the loader does not know the
    /// model.
    pub fn build(self) -> Result<DynPsu> {
        let adapter = self
            .adapter
            .ok_or_else(|| Error::Validation("adapter is required".to_string()))?;
        let loader = self
            .loader
            .ok_or_else(|| Error::Validation("config loader is required".to_string()))?;
        let strategy = self
            .strategy
            .unwrap_or_else(|| StrategyKind::default().into_strategy());
        Psu::with_strategy(self.model, adapter, loader, strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::SimAdapter;
    use crate::capabilities::Capabilities;
    use crate::config::StaticConfigLoader;
    use crate::strategy::{SimulationTiming, VirtualPsuStrategy};
    use crate::types::Ranges;

    fn loader() -> StaticConfigLoader {
        StaticConfigLoader::new().with_model("LAB", Capabilities::programmable(), Ranges::new())
    }

    #[test]
    fn builds_with_required_parts() {
        let mut psu = PsuBuilder::new("LAB")
            .with_adapter(SimAdapter::new())
            .with_loader(loader())
            .with_strategy(VirtualPsuStrategy::with_seed(1).with_timing(SimulationTiming::instant()))
            .build()
            .unwrap();
        psu.connect().unwrap();
        psu.set_voltage(2.5).unwrap();
        assert_eq!(psu.voltage(), 2.5);
        assert!(psu.adapter().is_connected());
    }

    #[test]
    fn missing_adapter() {
        let err = PsuBuilder::new("LAB").with_loader(loader()).build().unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("adapter")));
    }

    #[test]
    fn missing_loader() {
        let err = PsuBuilder::new("LAB")
            .with_adapter(SimAdapter::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("loader")));
    }

    #[test]
    fn blank_model() {
        let err = Psu::builder("")
            .with_adapter(SimAdapter::new())
            .with_loader(loader())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("model")));
    }

    #[test]
    fn shared_loader() {
        let shared: Arc<dyn ConfigLoader> = Arc::new(loader());
        for _ in 0..2 {
            Psu::builder("LAB")
                .with_adapter(SimAdapter::new())
                .with_shared_loader(Arc::clone(&shared))
                .with_strategy_kind(StrategyKind::Real)
                .build()
                .unwrap();
        }
        assert_eq!(Arc::strong_count(&shared), 1);
    }

    #[test]
    fn built_device_moves_across_threads() {
        let psu: DynPsu = Psu::builder("LAB")
            .with_adapter(SimAdapter::new())
            .with_loader(loader())
            .build()
            .unwrap();
        let model = std::thread::spawn(move || psu.model().to_string())
            .join()
            .unwrap();
        assert_eq!(model, "LAB");
    }
}
