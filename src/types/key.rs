// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parameter keys accepted by the generic `read`/`set` surface.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A readable channel of a power supply.
///
/// # Examples
///
/// ```
/// use psu_lib::types::ReadKey;
///
/// let key: ReadKey = "temp".parse().unwrap();
/// assert_eq!(key, ReadKey::Temp);
/// assert!("power".parse::<ReadKey>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadKey {
    /// Measured output voltage.
    Voltage,
    /// Measured output current.
    Current,
    /// Internal temperature.
    Temp,
    /// Output enable flag.
    Output,
}

impl ReadKey {
    /// Names accepted by [`ReadKey::from_str`].
    pub const NAMES: &'static [&'static str] = &["voltage", "current", "temp", "output"];

    /// Returns the key name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Voltage => "voltage",
            Self::Current => "current",
            Self::Temp => "temp",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for ReadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "voltage" => Ok(Self::Voltage),
            "current" => Ok(Self::Current),
            "temp" => Ok(Self::Temp),
            "output" => Ok(Self::Output),
            _ => Err(Error::UnknownKey {
                key: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

/// A writable parameter or command of a power supply.
///
/// # Examples
///
/// ```
/// use psu_lib::types::SetKey;
///
/// let key: SetKey = "current_limit".parse().unwrap();
/// assert_eq!(key, SetKey::CurrentLimit);
/// assert!("current".parse::<SetKey>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetKey {
    /// Output voltage setpoint.
    Voltage,
    /// Output current limit.
    CurrentLimit,
    /// Output enable flag.
    Output,
    /// Power cycle command (takes no value).
    PowerCycle,
}

impl SetKey {
    /// Names accepted by [`SetKey::from_str`].
    pub const NAMES: &'static [&'static str] = &["voltage", "current_limit", "output", "power_cycle"];

    /// Returns the key name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Voltage => "voltage",
            Self::CurrentLimit => "current_limit",
            Self::Output => "output",
            Self::PowerCycle => "power_cycle",
        }
    }
}

impl fmt::Display for SetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "voltage" => Ok(Self::Voltage),
            "current_limit" => Ok(Self::CurrentLimit),
            "output" => Ok(Self::Output),
            "power_cycle" => Ok(Self::PowerCycle),
            _ => Err(Error::UnknownKey {
                key: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}
