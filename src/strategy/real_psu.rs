// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Real-instrument strategy.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Result, TransportError};
use crate::strategy::{PsuStrategy, SimulationTiming, StrategyContext, VirtualPsuStrategy};
use crate::types::{ReadKey, Value};

/// A line-oriented command sink for an instrument.
pub trait CommandChannel: fmt::Debug + Send {
    /// Writes one command line.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the line cannot be sent.
    fn write_line(&mut self, line: &str) -> std::result::Result<(), TransportError>;

    /// Writes a query line and returns the response line.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the exchange fails.
    fn query(&mut self, line: &str) -> std::result::Result<String, TransportError>;
}

/// A [`CommandChannel`] that records every line it is given.
///
/// Clones share the same log, so a test can keep one handle and move the
/// other into a strategy.
///
/// # Examples
///
/// ```
/// use psu_lib::strategy::{CommandChannel, RecordingChannel};
///
/// let channel = RecordingChannel::new().with_response("ACME,PSU-1,0,1.0");
/// let mut handle = channel.clone();
/// handle.write_line("OUTP ON").unwrap();
/// assert_eq!(handle.query("*IDN?").unwrap(), "ACME,PSU-1,0,1.0");
/// assert_eq!(channel.lines(), ["OUTP ON", "*IDN?"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingChannel {
    inner: Arc<Mutex<Recording>>,
}

#[derive(Debug, Default)]
struct Recording {
    lines: Vec<String>,
    responses: VecDeque<String>,
}

impl RecordingChannel {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for the next query.
    #[must_use]
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.inner.lock().responses.push_back(response.into());
        self
    }

    /// Returns every line written or queried so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.inner.lock().lines.clone()
    }

    /// Forgets the recorded lines.
    pub fn clear(&self) {
        self.inner.lock().lines.clear();
    }
}

impl CommandChannel for RecordingChannel {
    fn write_line(&mut self, line: &str) -> std::result::Result<(), TransportError> {
        self.inner.lock().lines.push(line.to_string());
        Ok(())
    }

    fn query(&mut self, line: &str) -> std::result::Result<String, TransportError> {
        let mut recording = self.inner.lock();
        recording.lines.push(line.to_string());
        Ok(recording.responses.pop_front().unwrap_or_default())
    }
}

/// Strategy for a physical instrument.
///
/// State is mirrored by an internal [`VirtualPsuStrategy`], so readings and
/// delays behave like the simulation. When a [`CommandChannel`] is wired in,
/// every accepted command is first written to it as a command line:
///
/// | Operation | Line |
/// |-----------|------|
/// | `set_voltage(5.0)` | `VOLT 5` |
/// | `set_current_limit(0.2)` | `CURR 0.2` |
/// | `toggle_output(true)` | `OUTP ON` |
/// | `power_cycle()` | `SYST:PCYC` |
///
/// `initialize` queries `*IDN?` on the channel.
#[derive(Debug)]
pub struct RealPsuStrategy {
    mirror: VirtualPsuStrategy,
    channel: Option<Box<dyn CommandChannel>>,
    identity: Option<String>,
}

impl RealPsuStrategy {
    /// Creates a strategy without a command channel.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mirror(VirtualPsuStrategy::new())
    }

    /// Creates a strategy around an existing mirror.
    #[must_use]
    pub fn with_mirror(mirror: VirtualPsuStrategy) -> Self {
        Self {
            mirror,
            channel: None,
            identity: None,
        }
    }

    /// Wires a command channel.
    #[must_use]
    pub fn with_channel(mut self, channel: impl CommandChannel + 'static) -> Self {
        self.channel = Some(Box::new(channel));
        self
    }

    /// Replaces the delays of the mirror.
    #[must_use]
    pub fn with_timing(mut self, timing: SimulationTiming) -> Self {
        self.mirror = self.mirror.with_timing(timing);
        self
    }

    /// Returns `true` if a command channel is wired.
    #[must_use]
    pub fn has_channel(&self) -> bool {
        self.channel.is_some()
    }

    /// Returns the identification string reported during `initialize`.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Returns the mirrored state.
    #[must_use]
    pub fn mirror(&self) -> &VirtualPsuStrategy {
        &self.mirror
    }

    fn send(&mut self, line: &str) -> Result<()> {
        if let Some(channel) = self.channel.as_mut() {
            tracing::debug!(line, "Sending instrument command");
            channel.write_line(line)?;
        }
        Ok(())
    }
}

impl Default for RealPsuStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl PsuStrategy for RealPsuStrategy {
    fn attach(&mut self, context: StrategyContext) {
        self.mirror.attach(context);
    }

    fn initialize(&mut self) -> Result<()> {
        if let Some(channel) = self.channel.as_mut() {
            let identity = channel.query("*IDN?")?;
            tracing::debug!(identity = %identity, "Instrument identified");
            self.identity = Some(identity);
        }
        self.mirror.initialize()
    }

    fn read(&mut self, key: ReadKey) -> Result<Value> {
        self.mirror.read(key)
    }

    fn set_voltage(&mut self, volts: f64) -> Result<()> {
        self.mirror.context().ranges().check("voltage", volts)?;
        self.send(&format!("VOLT {volts}"))?;
        self.mirror.set_voltage(volts)
    }

    fn set_current_limit(&mut self, amps: f64) -> Result<()> {
        self.mirror.context().ranges().check("current", amps)?;
        self.send(&format!("CURR {amps}"))?;
        self.mirror.set_current_limit(amps)
    }

    fn toggle_output(&mut self, on: bool) -> Result<()> {
        self.send(if on { "OUTP ON" } else { "OUTP OFF" })?;
        self.mirror.toggle_output(on)
    }

    fn power_cycle(&mut self) -> Result<()> {
        self.send("SYST:PCYC")?;
        self.mirror.power_cycle()
    }
}
