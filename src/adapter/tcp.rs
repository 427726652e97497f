// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TCP transport for LAN-attached instruments.

use std::io;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::adapter::Adapter;
use crate::error::TransportError;
use crate::types::millis;

/// A raw TCP (telnet-style) transport.
///
/// Most bench supplies with a LAN port accept line-oriented commands on a
/// plain socket (port 5025 for SCPI raw, 23 for telnet). This adapter opens
/// and closes that socket; it does not speak any command protocol.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use psu_lib::adapter::TcpAdapter;
///
/// let adapter = TcpAdapter::new("192.168.1.60", TcpAdapter::SCPI_RAW_PORT)
///     .with_timeout(Duration::from_secs(2));
/// assert_eq!(adapter.host(), "192.168.1.60");
/// assert_eq!(adapter.port(), 5025);
/// ```
#[derive(Debug)]
pub struct TcpAdapter {
    host: String,
    port: u16,
    timeout: Duration,
    stream: Option<TcpStream>,
}

impl TcpAdapter {
    /// Default telnet port.
    pub const TELNET_PORT: u16 = 23;
    /// Default SCPI raw socket port.
    pub const SCPI_RAW_PORT: u16 = 5025;
    /// Default connect and I/O timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates an adapter for `host:port`. No connection is made yet.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: Self::DEFAULT_TIMEOUT,
            stream: None,
        }
    }

    /// Sets the connect and I/O timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the remote address of the open connection.
    #[must_use]
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.as_ref().and_then(|s| s.peer_addr().ok())
    }

    fn resolve(&self) -> Result<SocketAddr, TransportError> {
        let endpoint = format!("{}:{}", self.host, self.port);
        let mut addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| TransportError::InvalidAddress(format!("{endpoint}: {e}")))?;
        addrs
            .next()
            .ok_or_else(|| TransportError::InvalidAddress(format!("{endpoint}: no addresses")))
    }
}

impl Adapter for TcpAdapter {
    fn connect(&mut self) -> Result<(), TransportError> {
        if self.stream.is_some() {
            return Ok(());
        }
        let addr = self.resolve()?;
        tracing::debug!(%addr, timeout_ms = millis(self.timeout), "Opening TCP connection");

        let stream = TcpStream::connect_timeout(&addr, self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        stream.set_nodelay(true)?;
        self.stream = Some(stream);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), TransportError> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };
        tracing::debug!(host = %self.host, port = self.port, "Closing TCP connection");
        match stream.shutdown(Shutdown::Both) {
            // The peer already went away; the socket is closed either way.
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other.map_err(TransportError::Io),
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}
