// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Behavior strategies of a power supply.
//!
//! A [`PsuStrategy`] decides *how* a command is carried out once the
//! [`Psu`](crate::Psu) facade has checked connection state, capabilities and
//! ranges. Two implementations exist:
//!
//! - [`VirtualPsuStrategy`]: closed-form simulation with seeded noise and
//!   settling delays
//! - [`RealPsuStrategy`]: the substitution point for instrument command
//!   encoding; mirrors a virtual supply and optionally writes command lines to
//!   a [`CommandChannel`]
//!
//! Strategies receive the model's capabilities and ranges through a
//! [`StrategyContext`] when they are attached to a device.

mod real_psu;
mod virtual_psu;

pub use real_psu::{CommandChannel, RealPsuStrategy, RecordingChannel};
pub use virtual_psu::VirtualPsuStrategy;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capabilities::Capabilities;
use crate::error::{Error, Result};
use crate::types::{ReadKey, Ranges, Value};

/// Noise amplitude of simulated voltage readings, in volts.
pub const VOLTAGE_NOISE: f64 = 0.1;
/// Noise amplitude of simulated current readings, in amperes.
pub const CURRENT_NOISE: f64 = 0.01;
/// Noise amplitude of simulated temperature readings, in degrees Celsius.
pub const TEMP_NOISE: f64 = 1.0;
/// Simulated ambient temperature, in degrees Celsius.
pub const AMBIENT_TEMP: f64 = 25.0;

/// Trait for the read/write primitives of a power supply.
///
/// All methods block for their full duration.
pub trait PsuStrategy: fmt::Debug + Send {
    /// Receives the model's capabilities and ranges.
    ///
    /// Called once when the strategy is handed to a device.
    fn attach(&mut self, context: StrategyContext);

    /// Prepares the strategy after the transport connected.
    ///
    /// # Errors
    ///
    /// Returns an error if the instrument cannot be prepared.
    fn initialize(&mut self) -> Result<()>;

    /// Reads a channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the reading cannot be obtained.
    fn read(&mut self, key: ReadKey) -> Result<Value>;

    /// Applies an output voltage setpoint.
    ///
    /// # Errors
    ///
    /// Returns `Error::Range` if `volts` is outside the `voltage` range.
    fn set_voltage(&mut self, volts: f64) -> Result<()>;

    /// Applies an output current limit.
    ///
    /// # Errors
    ///
    /// Returns `Error::Range` if `amps` is outside the `current` range.
    fn set_current_limit(&mut self, amps: f64) -> Result<()>;

    /// Enables or disables the output.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be applied.
    fn toggle_output(&mut self, on: bool) -> Result<()>;

    /// Switches the output off, waits for the recovery interval and switches
    /// it back on.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be applied.
    fn power_cycle(&mut self) -> Result<()>;
}

impl<S: PsuStrategy + ?Sized> PsuStrategy for Box<S> {
    fn attach(&mut self, context: StrategyContext) {
        (**self).attach(context);
    }

    fn initialize(&mut self) -> Result<()> {
        (**self).initialize()
    }

    fn read(&mut self, key: ReadKey) -> Result<Value> {
        (**self).read(key)
    }

    fn set_voltage(&mut self, volts: f64) -> Result<()> {
        (**self).set_voltage(volts)
    }

    fn set_current_limit(&mut self, amps: f64) -> Result<()> {
        (**self).set_current_limit(amps)
    }

    fn toggle_output(&mut self, on: bool) -> Result<()> {
        (**self).toggle_output(on)
    }

    fn power_cycle(&mut self) -> Result<()> {
        (**self).power_cycle()
    }
}

/// The read-only model data a strategy works against.
#[derive(Debug, Clone, Default)]
pub struct StrategyContext {
    capabilities: Arc<Capabilities>,
    ranges: Arc<Ranges>,
}

impl StrategyContext {
    /// Creates a context sharing the given tables.
    #[must_use]
    pub fn new(capabilities: Arc<Capabilities>, ranges: Arc<Ranges>) -> Self {
        Self {
            capabilities,
            ranges,
        }
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
}

/// Selects a strategy implementation by name.
///
/// # Examples
///
/// ```
/// use psu_lib::strategy::StrategyKind;
///
/// let kind: StrategyKind = "real".parse().unwrap();
/// assert_eq!(kind, StrategyKind::Real);
/// assert_eq!(StrategyKind::default().as_str(), "virtual");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// [`VirtualPsuStrategy`].
    #[default]
    Virtual,
    /// [`RealPsuStrategy`].
    Real,
}

impl StrategyKind {
    /// Names accepted by [`StrategyKind::from_str`].
    pub const NAMES: &'static [&'static str] = &["virtual", "real"];

    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Virtual => "virtual",
            Self::Real => "real",
        }
    }

    /// Creates a strategy of this kind with default settings.
    #[must_use]
    pub fn into_strategy(self) -> Box<dyn PsuStrategy> {
        match self {
            Self::Virtual => Box::new(VirtualPsuStrategy::new()),
            Self::Real => Box::new(RealPsuStrategy::new()),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "virtual" => Ok(Self::Virtual),
            "real" => Ok(Self::Real),
            _ => Err(Error::UnknownKey {
                key: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

/// Delays of the simulated instrument.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use psu_lib::strategy::SimulationTiming;
///
/// let timing = SimulationTiming::default()
///     .with_power_cycle(Duration::from_secs(1));
/// assert_eq!(timing.set_voltage_settle, Duration::from_millis(100));
/// assert_eq!(timing.power_cycle, Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationTiming {
    /// Settling time after a voltage change.
    #[serde(with = "duration_ms")]
    pub set_voltage_settle: Duration,
    /// Stabilization time when the output switches on.
    #[serde(with = "duration_ms")]
    pub output_on: Duration,
    /// Off time during a power cycle.
    #[serde(with = "duration_ms")]
    pub power_cycle: Duration,
}

impl SimulationTiming {
    /// Timing with every delay set to zero.
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            set_voltage_settle: Duration::ZERO,
            output_on: Duration::ZERO,
            power_cycle: Duration::ZERO,
        }
    }

    /// Sets the voltage settling time.
    #[must_use]
    pub fn with_set_voltage_settle(mut self, delay: Duration) -> Self {
        self.set_voltage_settle = delay;
        self
    }

    /// Sets the output-on stabilization time.
    #[must_use]
    pub fn with_output_on(mut self, delay: Duration) -> Self {
        self.output_on = delay;
        self
    }

    /// Sets the power cycle off time.
    #[must_use]
    pub fn with_power_cycle(mut self, delay: Duration) -> Self {
        self.power_cycle = delay;
        self
    }
}

impl Default for SimulationTiming {
    fn default() -> Self {
        Self {
            set_voltage_settle: Duration::from_millis(100),
            output_on: Duration::from_millis(500),
            power_cycle: Duration::from_secs(5),
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(crate::types::millis(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
