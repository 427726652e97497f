// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last applied setpoints of a power supply.

use serde::{Deserialize, Serialize};

/// The values a caller last commanded successfully.
///
/// Setpoints are bookkeeping, not measurements: they are never read back from
/// the instrument and change only after the strategy accepted a command.
///
/// # Examples
///
/// ```
/// use psu_lib::state::Setpoints;
///
/// let sp = Setpoints::default();
/// assert_eq!(sp.voltage, 0.0);
/// assert_eq!(sp.current_limit, 0.0);
/// assert!(!sp.output);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Setpoints {
    /// Output voltage setpoint in volts.
    pub voltage: f64,
    /// Output current limit in amperes.
    pub current_limit: f64,
    /// Output enable flag.
    pub output: bool,
}
