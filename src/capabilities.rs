// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power supply capabilities.
//!
//! A model's capabilities are a table of named boolean flags loaded from
//! configuration. Four of them gate the control surface of a
//! [`Psu`](crate::Psu) and are also available as the typed [`Capability`]
//! enum; any other flag a configuration file declares is kept verbatim and can
//! be queried by name.
//!
//! Capabilities are immutable once loaded. The device and its strategy share
//! them through an `Arc`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A control capability that gates a [`Psu`](crate::Psu) setter.
///
/// # Examples
///
/// ```
/// use psu_lib::Capability;
///
/// assert_eq!(Capability::SetVoltage.as_str(), "set_voltage");
/// assert_eq!(Capability::from_name("power_cycle"), Some(Capability::PowerCycle));
/// assert_eq!(Capability::from_name("set_frequency"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Program the output voltage setpoint.
    SetVoltage,
    /// Program the output current limit.
    SetCurrentLimit,
    /// Switch the output on or off.
    ToggleOutput,
    /// Power cycle the instrument.
    PowerCycle,
}

impl Capability {
    /// All control capabilities, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::SetVoltage,
        Self::SetCurrentLimit,
        Self::ToggleOutput,
        Self::PowerCycle,
    ];

    /// Returns the configuration name of the capability.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SetVoltage => "set_voltage",
            Self::SetCurrentLimit => "set_current_limit",
            Self::ToggleOutput => "toggle_output",
            Self::PowerCycle => "power_cycle",
        }
    }

    /// Looks up a control capability by its configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability flags of a power supply model.
///
/// # Examples
///
/// ```
/// use psu_lib::{Capabilities, Capability};
///
/// let caps = Capabilities::builder()
///     .with_set_voltage()
///     .with_output_toggle()
///     .with_flag("remote_sense", true)
///     .build();
///
/// assert!(caps.supports(Capability::SetVoltage));
/// assert!(!caps.supports(Capability::PowerCycle));
/// assert_eq!(caps.get("remote_sense"), Some(true));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities {
    flags: BTreeMap<String, bool>,
}

impl Capabilities {
    /// Creates an empty capability set (every control operation disabled).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for a custom capability set.
    #[must_use]
    pub fn builder() -> CapabilitiesBuilder {
        CapabilitiesBuilder::new()
    }

    /// Capabilities of a fully programmable supply.
    ///
    /// - Voltage setpoint
    /// - Current limit
    /// - Output switching
    /// - Power cycling
    #[must_use]
    pub fn programmable() -> Self {
        Capability::ALL.into_iter().map(|c| (c, true)).collect()
    }

    /// Capabilities of a fixed-voltage supply that can only switch its output.
    #[must_use]
    pub fn fixed_output() -> Self {
        Self::builder().with_output_toggle().build()
    }

    /// Returns whether the given control capability is enabled.
    ///
    /// A flag that is absent from the table counts as disabled.
    #[must_use]
    pub fn supports(&self, capability: Capability) -> bool {
        self.is_enabled(capability.as_str())
    }

    /// Returns whether the flag with the given name is present and enabled.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Returns the raw value of a flag, or `None` if the table does not declare it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<bool> {
        self.flags.get(name).copied()
    }

    /// Iterates over all declared flags in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns the number of declared flags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns `true` if no flags are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Returns the flags as a name-to-value map.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, bool> {
        &self.flags
    }
}

impl From<BTreeMap<String, bool>> for Capabilities {
    fn from(flags: BTreeMap<String, bool>) -> Self {
        Self { flags }
    }
}

impl FromIterator<(Capability, bool)> for Capabilities {
    fn from_iter<I: IntoIterator<Item = (Capability, bool)>>(iter: I) -> Self {
        Self {
            flags: iter
                .into_iter()
                .map(|(c, v)| (c.as_str().to_string(), v))
                .collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, bool)> for Capabilities {
    fn from_iter<I: IntoIterator<Item = (&'a str, bool)>>(iter: I) -> Self {
        Self {
            flags: iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

/// Builder for creating custom capabilities.
#[derive(Debug, Default)]
pub struct CapabilitiesBuilder {
    inner: Capabilities,
}

impl CapabilitiesBuilder {
    /// Creates a new builder with no flags declared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables voltage programming.
    #[must_use]
    pub fn with_set_voltage(self) -> Self {
        self.with(Capability::SetVoltage)
    }

    /// Enables current limit programming.
    #[must_use]
    pub fn with_current_limit(self) -> Self {
        self.with(Capability::SetCurrentLimit)
    }

    /// Enables output switching.
    #[must_use]
    pub fn with_output_toggle(self) -> Self {
        self.with(Capability::ToggleOutput)
    }

    /// Enables power cycling.
    #[must_use]
    pub fn with_power_cycle(self) -> Self {
        self.with(Capability::PowerCycle)
    }

    /// Enables a control capability.
    #[must_use]
    pub fn with(self, capability: Capability) -> Self {
        self.with_flag(capability.as_str(), true)
    }

    /// Declares an arbitrary named flag.
    #[must_use]
    pub fn with_flag(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.inner.flags.insert(name.into(), enabled);
        self
    }

    /// Builds the capabilities.
    #[must_use]
    pub fn build(self) -> Capabilities {
        self.inner
    }
}
