// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection lifecycle state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection state of a device.
///
/// A device starts [`Disconnected`](Self::Disconnected). Only the lifecycle
/// operations `connect` and `disconnect` move it between states:
///
/// ```text
/// Disconnected -> Connecting -> Connected -> Disconnecting -> Disconnected
///                     |                           |
///                     +---------> Error <---------+
/// ```
///
/// `Error` is left only by a fresh `connect` attempt.
///
/// # Examples
///
/// ```
/// use psu_lib::state::DeviceState;
///
/// let state = DeviceState::default();
/// assert_eq!(state, DeviceState::Disconnected);
/// assert_eq!(state.as_str(), "disconnected");
/// assert!(!state.is_connected());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    /// Not connected. Initial state.
    #[default]
    Disconnected,
    /// Adapter connect and post-connect initialization in progress.
    Connecting,
    /// Connected and usable.
    Connected,
    /// Adapter disconnect in progress.
    Disconnecting,
    /// A connect or disconnect attempt failed.
    Error,
}

impl DeviceState {
    /// Returns the lowercase state name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
            Self::Error => "error",
        }
    }

    /// Returns `true` if the device is usable.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` if the last lifecycle operation failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_disconnected() {
        assert_eq!(DeviceState::default(), DeviceState::Disconnected);
    }

    #[test]
    fn only_connected_is_usable() {
        assert!(DeviceState::Connected.is_connected());
        for state in [
            DeviceState::Disconnected,
            DeviceState::Connecting,
            DeviceState::Disconnecting,
            DeviceState::Error,
        ] {
            assert!(!state.is_connected(), "{state} must not be usable");
        }
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(DeviceState::Disconnecting.to_string(), "disconnecting");
        assert_eq!(DeviceState::Error.to_string(), "error");
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DeviceState::Connected).unwrap(),
            "\"connected\""
        );
    }
}
