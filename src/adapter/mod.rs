// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport adapters.
//!
//! An adapter owns the connection to an instrument and nothing else: it can
//! open it, close it and report whether it is open. It never interprets power
//! supply semantics; those belong to the [strategy](crate::strategy).
//!
//! # Adapters
//!
//! - [`SimAdapter`]: In-memory transport with optional connect latency and
//!   injectable failures
//! - [`TcpAdapter`]: Raw TCP (telnet-style) transport with connect and I/O
//!   timeouts (feature `tcp`)

mod sim;
#[cfg(feature = "tcp")]
mod tcp;

pub use sim::SimAdapter;
#[cfg(feature = "tcp")]
pub use tcp::TcpAdapter;

use std::fmt;

use crate::error::TransportError;

/// Trait for transport implementations that connect a device to an instrument.
///
/// Implementations must make `connect` on an open transport and `disconnect`
/// on a closed one harmless.
pub trait Adapter: fmt::Debug + Send {
    /// Opens the transport.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the instrument cannot be reached.
    fn connect(&mut self) -> Result<(), TransportError>;

    /// Closes the transport.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if closing the transport fails.
    fn disconnect(&mut self) -> Result<(), TransportError>;

    /// Returns whether the transport is open.
    fn is_connected(&self) -> bool;
}

impl<A: Adapter + ?Sized> Adapter for Box<A> {
    fn connect(&mut self) -> Result<(), TransportError> {
        (**self).connect()
    }

    fn disconnect(&mut self) -> Result<(), TransportError> {
        (**self).disconnect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}
