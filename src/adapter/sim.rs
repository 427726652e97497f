// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simulated transport.

use std::thread;
use std::time::Duration;

use crate::adapter::Adapter;
use crate::error::TransportError;

/// An in-memory transport that is always reachable unless told otherwise.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use psu_lib::adapter::{Adapter, SimAdapter};
///
/// let mut adapter = SimAdapter::new().with_connect_delay(Duration::from_millis(5));
/// adapter.connect().unwrap();
/// assert!(adapter.is_connected());
///
/// let mut broken = SimAdapter::new().failing();
/// assert!(broken.connect().is_err());
/// assert!(!broken.is_connected());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimAdapter {
    connected: bool,
    connect_delay: Duration,
    fail_connect: bool,
    fail_disconnect: bool,
    connect_count: usize,
}

impl SimAdapter {
    /// Creates a simulated transport with no latency and no failures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps for `delay` on every connect, modeling link setup latency.
    #[must_use]
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    /// Makes every connect attempt fail.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Makes every disconnect attempt fail.
    #[must_use]
    pub fn failing_disconnect(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }

    /// Enables or disables connect failures on an existing adapter.
    pub fn set_fail_connect(&mut self, fail: bool) {
        self.fail_connect = fail;
    }

    /// Enables or disables disconnect failures on an existing adapter.
    pub fn set_fail_disconnect(&mut self, fail: bool) {
        self.fail_disconnect = fail;
    }

    /// Returns how many times the link was actually opened.
    #[must_use]
    pub fn connect_count(&self) -> usize {
        self.connect_count
    }
}

impl Adapter for SimAdapter {
    fn connect(&mut self) -> Result<(), TransportError> {
        if self.connected {
            return Ok(());
        }
        if !self.connect_delay.is_zero() {
            thread::sleep(self.connect_delay);
        }
        if self.fail_connect {
            return Err(TransportError::ConnectionFailed(
                "simulated connect failure".to_string(),
            ));
        }
        self.connected = true;
        self.connect_count += 1;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), TransportError> {
        if !self.connected {
            return Ok(());
        }
        if self.fail_disconnect {
            return Err(TransportError::DisconnectFailed(
                "simulated disconnect failure".to_string(),
            ));
        }
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
