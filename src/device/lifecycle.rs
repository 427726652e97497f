// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection state machine.

use crate::adapter::Adapter;
use crate::error::{ConnectionError, Error, Result};
use crate::state::DeviceState;

/// Owns the adapter and the only mutable copy of the device state.
///
/// ```text
/// Disconnected -> Connecting -> Connected -> Disconnecting -> Disconnected
///                      |                           |
///                      +---------> Error <---------+
/// ```
///
/// `Error` is left by a new `connect` (retry) or a `disconnect`.
#[derive(Debug)]
pub(crate) struct Lifecycle<A> {
    adapter: A,
    state: DeviceState,
}

impl<A: Adapter> Lifecycle<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            state: DeviceState::Disconnected,
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn into_adapter(self) -> A {
        self.adapter
    }

    /// Opens the adapter and runs `on_connect` once it is open.
    ///
    /// On failure the adapter is closed again before entering `Error`, so a
    /// failed connect never leaves the transport open.
    pub fn connect(&mut self, model: &str, on_connect: impl FnOnce() -> Result<()>) -> Result<()> {
        if self.state == DeviceState::Connected {
            return Ok(());
        }
        self.transition(model, DeviceState::Connecting);

        let outcome = self
            .adapter
            .connect()
            .map_err(Error::from)
            .and_then(|()| on_connect());

        match outcome {
            Ok(()) => {
                self.transition(model, DeviceState::Connected);
                tracing::info!(model = %model, "Device connected");
                Ok(())
            }
            Err(e) => {
                if self.adapter.is_connected()
                    && let Err(rollback) = self.adapter.disconnect()
                {
                    tracing::warn!(
                        model = %model,
                        error = %rollback,
                        "Failed to close adapter after connect failure"
                    );
                }
                self.transition(model, DeviceState::Error);
                tracing::warn!(model = %model, error = %e, "Connect failed");
                Err(ConnectionError::ConnectFailed(Box::new(e)).into())
            }
        }
    }

    pub fn disconnect(&mut self, model: &str) -> Result<()> {
        if self.state == DeviceState::Disconnected {
            return Ok(());
        }
        self.transition(model, DeviceState::Disconnecting);

        match self.adapter.disconnect() {
            Ok(()) => {
                self.transition(model, DeviceState::Disconnected);
                tracing::info!(model = %model, "Device disconnected");
                Ok(())
            }
            Err(e) => {
                self.transition(model, DeviceState::Error);
                tracing::warn!(model = %model, error = %e, "Disconnect failed");
                Err(ConnectionError::DisconnectFailed(Box::new(e.into())).into())
            }
        }
    }

    pub fn require_connected(&self) -> Result<()> {
        if self.state.is_connected() {
            Ok(())
        } else {
            Err(ConnectionError::NotConnected { state: self.state }.into())
        }
    }

    fn transition(&mut self, model: &str, next: DeviceState) {
        tracing::debug!(model = %model, from = %self.state, to = %next, "State transition");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;
    use crate::adapter::SimAdapter;
    use crate::error::TransportError;

    #[test]
    fn starts_disconnected() {
        let lifecycle = Lifecycle::new(SimAdapter::new());
        assert_eq!(lifecycle.state(), DeviceState::Disconnected);
        let err = lifecycle.require_connected().unwrap_err();
        assert!(matches!(
            err,
            Error::Connection(ConnectionError::NotConnected {
                state: DeviceState::Disconnected
            })
        ));
    }

    #[test]
    fn connect_runs_hook_after_adapter() {
        let mut lifecycle = Lifecycle::new(SimAdapter::new());
        let mut hook_ran = false;
        lifecycle
            .connect("M", || {
                hook_ran = true;
                Ok(())
            })
            .unwrap();
        assert!(hook_ran);
        assert_eq!(lifecycle.state(), DeviceState::Connected);
        assert!(lifecycle.adapter().is_connected());
        lifecycle.require_connected().unwrap();
    }

    #[test]
    fn connect_when_connected_skips_hook() {
        let mut lifecycle = Lifecycle::new(SimAdapter::new());
        lifecycle.connect("M", || Ok(())).unwrap();
        let mut calls = 0;
        lifecycle
            .connect("M", || {
                calls += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(calls, 0);
        assert_eq!(lifecycle.adapter().connect_count(), 1);
    }

    #[test]
    fn adapter_failure_moves_to_error() {
        let mut lifecycle = Lifecycle::new(SimAdapter::new().failing());
        let err = lifecycle.connect("M", || Ok(())).unwrap_err();
        assert!(err.is_connection());
        assert_eq!(lifecycle.state(), DeviceState::Error);

        let source = err.source().and_then(|s| s.source());
        assert!(source.is_some_and(|s| s.to_string().contains("simulated connect failure")));
    }

    #[test]
    fn hook_failure_moves_to_error() {
        let mut lifecycle = Lifecycle::new(SimAdapter::new());
        let err = lifecycle
            .connect("M", || Err(TransportError::NotOpen.into()))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Connection(ConnectionError::ConnectFailed(_))
        ));
        assert_eq!(lifecycle.state(), DeviceState::Error);
    }

    #[test]
    fn hook_failure_closes_adapter() {
        let mut lifecycle = Lifecycle::new(SimAdapter::new());
        assert!(lifecycle.connect("M", || Err(TransportError::NotOpen.into())).is_err());
        assert!(!lifecycle.adapter().is_connected());
        assert_eq!(lifecycle.adapter().connect_count(), 1);
    }

    #[test]
    fn hook_failure_keeps_cause_when_close_fails() {
        let mut lifecycle = Lifecycle::new(SimAdapter::new().failing_disconnect());
        let err = lifecycle
            .connect("M", || Err(TransportError::NotOpen.into()))
            .unwrap_err();
        assert_eq!(lifecycle.state(), DeviceState::Error);
        let cause = err.source().map(ToString::to_string).unwrap_or_default();
        assert!(cause.contains("not open"), "unexpected cause: {cause}");

        lifecycle.adapter.set_fail_disconnect(false);
        lifecycle.disconnect("M").unwrap();
        assert!(!lifecycle.adapter().is_connected());
    }

    #[test]
    fn retry_from_error() {
        let mut lifecycle = Lifecycle::new(SimAdapter::new().failing());
        assert!(lifecycle.connect("M", || Ok(())).is_err());
        lifecycle.adapter.set_fail_connect(false);
        lifecycle.connect("M", || Ok(())).unwrap();
        assert_eq!(lifecycle.state(), DeviceState::Connected);
    }

    #[test]
    fn disconnect_round_trip() {
        let mut lifecycle = Lifecycle::new(SimAdapter::new());
        lifecycle.disconnect("M").unwrap();
        lifecycle.connect("M", || Ok(())).unwrap();
        lifecycle.disconnect("M").unwrap();
        assert_eq!(lifecycle.state(), DeviceState::Disconnected);
        assert!(!lifecycle.into_adapter().is_connected());
    }

    #[test]
    fn disconnect_failure_moves_to_error() {
        let mut lifecycle = Lifecycle::new(SimAdapter::new().failing_disconnect());
        lifecycle.connect("M", || Ok(())).unwrap();
        let err = lifecycle.disconnect("M").unwrap_err();
        assert!(matches!(
            err,
            Error::Connection(ConnectionError::DisconnectFailed(_))
        ));
        assert_eq!(lifecycle.state(), DeviceState::Error);
        assert!(lifecycle.require_connected().is_err());

        lifecycle.adapter.set_fail_disconnect(false);
        lifecycle.disconnect("M").unwrap();
        assert_eq!(lifecycle.state(), DeviceState::Disconnected);
    }
}
