// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power supply device abstraction.
//!
//! [`Psu`] is the capability- and range-gated facade over a
//! [`PsuStrategy`]. Every write goes through the same checks, in order:
//!
//! 1. the device must be connected,
//! 2. the model must expose the matching [`Capability`],
//! 3. numeric values must be finite and inside the model's [`Ranges`],
//!
//! and only then is the strategy called. The cached setpoint changes after the
//! strategy accepted the command. Reads only require a connection.
//!
//! ```
//! use std::sync::Arc;
//! use psu_lib::adapter::SimAdapter;
//! use psu_lib::config::YamlConfigLoader;
//! use psu_lib::strategy::{SimulationTiming, VirtualPsuStrategy};
//! use psu_lib::Psu;
//!
//! # fn main() -> psu_lib::Result<()> {
//! let strategy = VirtualPsuStrategy::new().with_timing(SimulationTiming::instant());
//! let mut psu = Psu::with_strategy(
//!     "RIGOL-DP832",
//!     SimAdapter::new(),
//!     Arc::new(YamlConfigLoader::bundled()?),
//!     strategy,
//! )?;
//!
//! psu.connect()?;
//! psu.set_voltage(5.0)?;
//! psu.set_current_limit(0.2)?;
//! psu.set_output(true)?;
//! assert!((psu.read_voltage()? - 5.0).abs() <= 0.1 + 1e-9);
//! psu.disconnect()?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod lifecycle;
mod session;

pub use builder::{DynPsu, PsuBuilder};
pub use session::PsuSession;

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::adapter::Adapter;
use crate::capabilities::{Capabilities, Capability};
use crate::config::{ConfigLoader, ModelInfo};
use crate::error::{Error, Result};
use crate::state::{DeviceState, Setpoints};
use crate::strategy::{PsuStrategy, StrategyContext, VirtualPsuStrategy};
use crate::types::{ReadKey, Ranges, SetKey, Value};

use lifecycle::Lifecycle;

/// A bench power supply.
///
/// # Type Parameters
///
/// - `A`: the transport, e.g. [`SimAdapter`](crate::adapter::SimAdapter) or
///   [`TcpAdapter`](crate::adapter::TcpAdapter)
/// - `S`: the behavior, [`VirtualPsuStrategy`] unless chosen otherwise
///
/// All operations block until they complete. Mutating operations take
/// `&mut self`; use [`into_shared`](Self::into_shared) to share a device
/// between threads.
#[derive(Debug)]
pub struct Psu<A: Adapter, S: PsuStrategy = VirtualPsuStrategy> {
    model: String,
    loader: Arc<dyn ConfigLoader>,
    capabilities: Arc<Capabilities>,
    ranges: Arc<Ranges>,
    setpoints: Setpoints,
    lifecycle: Lifecycle<A>,
    strategy: S,
}

/// A serializable snapshot of a device, taken without I/O.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsuStatus {
    /// The model identifier.
    pub model: String,
    /// The lifecycle state.
    pub state: DeviceState,
    /// The last applied setpoints.
    pub setpoints: Setpoints,
    /// The model's capability flags.
    pub capabilities: Capabilities,
}

impl<A: Adapter> Psu<A> {
    /// Creates a device driven by a [`VirtualPsuStrategy`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if `model` is blank and `Error::Config` if
    /// the loader does not know the model.
    pub fn new(model: impl Into<String>, adapter: A, loader: Arc<dyn ConfigLoader>) -> Result<Self> {
        Self::with_strategy(model, adapter, loader, VirtualPsuStrategy::new())
    }
}

impl Psu<Box<dyn Adapter>, Box<dyn PsuStrategy>> {
    /// Starts building a device whose adapter and strategy are chosen at
    /// runtime.
    #[must_use]
    pub fn builder(model: impl Into<String>) -> PsuBuilder {
        PsuBuilder::new(model)
    }
}

impl<A: Adapter, S: PsuStrategy> Psu<A, S> {
    /// Creates a device driven by `strategy`.
    ///
    /// Capabilities and ranges are loaded once and attached to the strategy.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if `model` is blank and `Error::Config` if
    /// the loader does not know the model.
    pub fn with_strategy(
        model: impl Into<String>,
        adapter: A,
        loader: Arc<dyn ConfigLoader>,
        mut strategy: S,
    ) -> Result<Self> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(Error::Validation("model is required".to_string()));
        }

        let capabilities = Arc::new(loader.load_capabilities(&model)?);
        let ranges = Arc::new(loader.load_ranges(&model)?);
        strategy.attach(StrategyContext::new(
            Arc::clone(&capabilities),
            Arc::clone(&ranges),
        ));
        tracing::debug!(model = %model, capabilities = capabilities.len(), "Created PSU");

        Ok(Self {
            model,
            loader,
            capabilities,
            ranges,
            setpoints: Setpoints::default(),
            lifecycle: Lifecycle::new(adapter),
            strategy,
        })
    }

    // ========== Lifecycle ==========

    /// Opens the transport and initializes the strategy.
    ///
    /// Does nothing if the device is already connected. A device in the
    /// [`DeviceState::Error`] state may be connected again.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if the adapter or the strategy fails; the
    /// device is then in the `Error` state.
    pub fn connect(&mut self) -> Result<()> {
        let strategy = &mut self.strategy;
        self.lifecycle
            .connect(&self.model, || strategy.initialize())
    }

    /// Closes the transport.
    ///
    /// Does nothing if the device is already disconnected.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if the adapter fails; the device is then
    /// in the `Error` state.
    pub fn disconnect(&mut self) -> Result<()> {
        self.lifecycle.disconnect(&self.model)
    }

    /// Checks that the device is connected.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` unless the state is `Connected`.
    pub fn require_connected(&self) -> Result<()> {
        self.lifecycle.require_connected()
    }

    /// Connects and returns a guard that disconnects when dropped.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if connecting fails.
    pub fn session(&mut self) -> Result<PsuSession<'_, A, S>> {
        PsuSession::open(self)
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.lifecycle.state()
    }

    /// Returns the lifecycle state as its lowercase name.
    #[must_use]
    pub fn get_state(&self) -> &'static str {
        self.lifecycle.state().as_str()
    }

    /// Returns `true` if the device is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.lifecycle.state().is_connected()
    }

    // ========== Setpoints ==========

    /// Returns the last applied voltage setpoint in volts.
    #[must_use]
    pub fn voltage(&self) -> f64 {
        self.setpoints.voltage
    }

    /// Returns the last applied current limit in amperes.
    #[must_use]
    pub fn current_limit(&self) -> f64 {
        self.setpoints.current_limit
    }

    /// Returns the last applied output flag.
    #[must_use]
    pub fn output(&self) -> bool {
        self.setpoints.output
    }

    /// Returns all setpoints.
    #[must_use]
    pub fn setpoints(&self) -> Setpoints {
        self.setpoints
    }

    /// Sets the output voltage.
    ///
    /// # Errors
    ///
    /// - `Error::Connection` if the device is not connected
    /// - `Error::CapabilityMissing` without the `set_voltage` capability
    /// - `Error::Value` if `volts` is not finite
    /// - `Error::Range` if `volts` is outside the `voltage` range
    pub fn set_voltage(&mut self, volts: f64) -> Result<()> {
        self.prepare_write(Capability::SetVoltage)?;
        let volts = Value::from(volts).expect_number("voltage")?;
        self.ranges.check("voltage", volts)?;
        tracing::debug!(model = %self.model, volts, "Setting voltage");
        self.strategy.set_voltage(volts)?;
        self.setpoints.voltage = volts;
        Ok(())
    }

    /// Sets the output current limit.
    ///
    /// # Errors
    ///
    /// - `Error::Connection` if the device is not connected
    /// - `Error::CapabilityMissing` without the `set_current_limit` capability
    /// - `Error::Value` if `amps` is not finite
    /// - `Error::Range` if `amps` is outside the `current` range
    pub fn set_current_limit(&mut self, amps: f64) -> Result<()> {
        self.prepare_write(Capability::SetCurrentLimit)?;
        let amps = Value::from(amps).expect_number("current_limit")?;
        self.ranges.check("current", amps)?;
        tracing::debug!(model = %self.model, amps, "Setting current limit");
        self.strategy.set_current_limit(amps)?;
        self.setpoints.current_limit = amps;
        Ok(())
    }

    /// Enables or disables the output.
    ///
    /// # Errors
    ///
    /// - `Error::Connection` if the device is not connected
    /// - `Error::CapabilityMissing` without the `toggle_output` capability
    pub fn set_output(&mut self, on: bool) -> Result<()> {
        self.prepare_write(Capability::ToggleOutput)?;
        tracing::debug!(model = %self.model, on, "Setting output");
        self.strategy.toggle_output(on)?;
        self.setpoints.output = on;
        Ok(())
    }

    /// Cycles the output off and back on.
    ///
    /// # Errors
    ///
    /// - `Error::Connection` if the device is not connected
    /// - `Error::CapabilityMissing` without the `power_cycle` capability
    pub fn power_cycle(&mut self) -> Result<()> {
        self.prepare_write(Capability::PowerCycle)?;
        tracing::debug!(model = %self.model, "Power cycling");
        self.strategy.power_cycle()?;
        self.setpoints.output = true;
        Ok(())
    }

    fn prepare_write(&self, capability: Capability) -> Result<()> {
        self.require_connected()?;
        if self.capabilities.supports(capability) {
            Ok(())
        } else {
            Err(Error::CapabilityMissing { capability })
        }
    }

    // ========== Readings ==========

    /// Reads the output voltage in volts.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if the device is not connected.
    pub fn read_voltage(&mut self) -> Result<f64> {
        Ok(self.read_key(ReadKey::Voltage)?.expect_number("voltage")?)
    }

    /// Reads the output current in amperes.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if the device is not connected.
    pub fn read_current(&mut self) -> Result<f64> {
        Ok(self.read_key(ReadKey::Current)?.expect_number("current")?)
    }

    /// Reads the temperature in degrees Celsius, if the supply reports one.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if the device is not connected.
    pub fn read_temp(&mut self) -> Result<Option<f64>> {
        match self.read_key(ReadKey::Temp)? {
            Value::None => Ok(None),
            value => Ok(Some(value.expect_number("temp")?)),
        }
    }

    /// Reads the output enable flag.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if the device is not connected.
    pub fn read_output(&mut self) -> Result<bool> {
        Ok(self.read_key(ReadKey::Output)?.expect_bool("output")?)
    }

    fn read_key(&mut self, key: ReadKey) -> Result<Value> {
        self.require_connected()?;
        self.strategy.read(key)
    }

    // ========== Generic Access ==========

    /// Reads a channel by name: `voltage`, `current`, `temp` or `output`.
    ///
    /// # Errors
    ///
    /// - `Error::Connection` if the device is not connected
    /// - `Error::UnknownKey` for any other name
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use psu_lib::{adapter::SimAdapter, config::YamlConfigLoader, types::Value, Psu};
    /// # fn main() -> psu_lib::Result<()> {
    /// let mut psu = Psu::new("RIGOL-DP832", SimAdapter::new(), Arc::new(YamlConfigLoader::bundled()?))?;
    /// psu.connect()?;
    /// assert_eq!(psu.read("output")?, Value::Bool(false));
    /// assert!(psu.read("power").is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn read(&mut self, key: &str) -> Result<Value> {
        self.require_connected()?;
        match key.parse::<ReadKey>()? {
            ReadKey::Voltage => self.read_voltage().map(Value::Number),
            ReadKey::Current => self.read_current().map(Value::Number),
            ReadKey::Temp => self.read_temp().map(Value::from),
            ReadKey::Output => self.read_output().map(Value::Bool),
        }
    }

    /// Writes a parameter by name.
    ///
    /// | Key | Value |
    /// |-----|-------|
    /// | `voltage` | number |
    /// | `current_limit` | number |
    /// | `output` | boolean |
    /// | `power_cycle` | ignored |
    ///
    /// # Errors
    ///
    /// - `Error::Connection` if the device is not connected
    /// - `Error::UnknownKey` for any other name
    /// - `Error::Value` if the value has the wrong kind
    /// - any error of the matching typed setter
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.require_connected()?;
        let value = value.into();
        match key.parse::<SetKey>()? {
            SetKey::Voltage => self.set_voltage(value.expect_number("voltage")?),
            SetKey::CurrentLimit => self.set_current_limit(value.expect_number("current_limit")?),
            SetKey::Output => self.set_output(value.expect_bool("output")?),
            SetKey::PowerCycle => self.power_cycle(),
        }
    }

    // ========== Model Data ==========

    /// Returns the model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the capability flags.
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns the numeric ranges.
    #[must_use]
    pub fn ranges(&self) -> &Ranges {
        &self.ranges
    }

    /// Looks up the model's descriptive metadata.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the loader has no entry for the model.
    pub fn model_info(&self) -> Result<ModelInfo> {
        Ok(self.loader.load_model_info(&self.model)?)
    }

    /// Returns a snapshot of the device.
    #[must_use]
    pub fn status(&self) -> PsuStatus {
        PsuStatus {
            model: self.model.clone(),
            state: self.state(),
            setpoints: self.setpoints,
            capabilities: Capabilities::clone(&self.capabilities),
        }
    }

    // ========== Ownership ==========

    /// Returns the adapter.
    #[must_use]
    pub fn adapter(&self) -> &A {
        self.lifecycle.adapter()
    }

    /// Returns the strategy.
    #[must_use]
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Consumes the device and returns its adapter and strategy.
    ///
    /// The adapter is returned as is; call [`disconnect`](Self::disconnect)
    /// first to close it.
    #[must_use]
    pub fn into_parts(self) -> (A, S) {
        (self.lifecycle.into_adapter(), self.strategy)
    }

    /// Wraps the device for use from several threads.
    #[must_use]
    pub fn into_shared(self) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(self))
    }
}
