// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state types.
//!
//! [`DeviceState`] is the connection lifecycle state every device carries,
//! while [`Setpoints`] records the values last applied to a power supply.

mod device_state;
mod setpoints;

pub use device_state::DeviceState;
pub use setpoints::Setpoints;
