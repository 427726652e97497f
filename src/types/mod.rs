// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for power supply control.
//!
//! # Types
//!
//! - [`Range`] / [`Ranges`] - Inclusive numeric bounds per parameter
//! - [`Value`] - Dynamically typed reading or setpoint
//! - [`ReadKey`] - Readable channels (`voltage`, `current`, `temp`, `output`)
//! - [`SetKey`] - Writable parameters (`voltage`, `current_limit`, `output`, `power_cycle`)

mod key;
mod range;
mod value;

use std::time::Duration;

pub use key::{ReadKey, SetKey};
pub use range::{Range, Ranges};
pub use value::Value;

/// Whole milliseconds of `d`, saturating at `u64::MAX`.
pub(crate) fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_truncates_sub_millisecond_part() {
        assert_eq!(millis(Duration::from_micros(1_999)), 1);
        assert_eq!(millis(Duration::from_secs(5)), 5_000);
    }

    #[test]
    fn millis_saturates() {
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
