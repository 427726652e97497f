// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `psu_lib` library.
//!
//! Every failure the library can report is a variant of [`Error`]. The
//! lifecycle, the capability/range gate and the strategies never print or
//! return sentinel values; they return one of these kinds:
//!
//! - [`Error::Connection`]: lifecycle failures and use of a device that is not
//!   connected
//! - [`Error::CapabilityMissing`]: a control operation the model does not expose
//! - [`Error::Range`]: a numeric setpoint outside the model's bounds
//! - [`Error::UnknownKey`]: generic `read`/`set` with an unrecognized parameter
//! - [`Error::Validation`]: construction-time misuse

use std::fmt;

use thiserror::Error;

use crate::capabilities::Capability;
use crate::state::DeviceState;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Connecting, disconnecting or using a device that is not connected failed.
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// The model does not expose the requested control capability.
    #[error("capability missing: {capability} is not supported by this model")]
    CapabilityMissing {
        /// The capability that was requested.
        capability: Capability,
    },

    /// A numeric setpoint lies outside the model's declared bounds.
    #[error("range error: {0}")]
    Range(#[from] RangeError),

    /// A generic `read`/`set` was invoked with an unrecognized parameter name.
    #[error("unknown key `{key}`; allowed: {}", .allowed.join(", "))]
    UnknownKey {
        /// The key that was requested.
        key: String,
        /// The keys accepted by the operation.
        allowed: &'static [&'static str],
    },

    /// The device was constructed with missing or invalid arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// A value had the wrong shape for the parameter it was written to.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// A transport adapter failed outside of the connection lifecycle.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Loading model configuration failed.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Returns `true` if this is a connection error.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if this is a missing-capability error.
    #[must_use]
    pub fn is_capability_missing(&self) -> bool {
        matches!(self, Self::CapabilityMissing { .. })
    }

    /// Returns `true` if this is a range error.
    #[must_use]
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Range(_))
    }
}

/// Errors raised by the connection lifecycle.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// An operation required a connected device.
    #[error("device is not connected (state: {state})")]
    NotConnected {
        /// The lifecycle state at the time of the call.
        state: DeviceState,
    },

    /// The adapter or the post-connect initialization failed.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] Box<Error>),

    /// The adapter failed to disconnect.
    #[error("disconnect failed: {0}")]
    DisconnectFailed(#[source] Box<Error>),
}

/// A numeric value outside the allowed bounds of a parameter.
#[derive(Debug, Error, Clone, PartialEq)]
pub struct RangeError {
    /// The parameter whose bound was violated (`voltage`, `current`, ...).
    pub parameter: String,
    /// The rejected value.
    pub value: f64,
    /// Lower bound, if any.
    pub min: Option<f64>,
    /// Upper bound, if any.
    pub max: Option<f64>,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} value {} is out of range [", self.parameter, self.value)?;
        match self.min {
            Some(min) => write!(f, "{min}, ")?,
            None => write!(f, "-inf, ")?,
        }
        match self.max {
            Some(max) => write!(f, "{max}]"),
            None => write!(f, "inf]"),
        }
    }
}

/// Errors related to the shape of dynamically typed values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A value of the wrong kind was supplied for a key.
    #[error("`{key}` expects a {expected} value")]
    TypeMismatch {
        /// The parameter key.
        key: &'static str,
        /// Human readable name of the expected kind.
        expected: &'static str,
    },

    /// A numeric value was NaN or infinite.
    #[error("`{key}` must be a finite number, got {value}")]
    NotFinite {
        /// The parameter key.
        key: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Errors reported by transport adapters.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Socket-level failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection to the instrument failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The configured address could not be resolved.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Disconnecting from the instrument failed.
    #[error("disconnect failed: {0}")]
    DisconnectFailed(String),

    /// The transport is not open.
    #[error("transport is not open")]
    NotOpen,
}

/// Errors related to loading model configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The model identifier is not present in the configuration tables.
    #[error("model `{model}` not found in {table}")]
    UnknownModel {
        /// The requested model identifier.
        model: String,
        /// The table that was searched (`capabilities`, `ranges`, `models`).
        table: &'static str,
    },

    /// A configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that failed to load.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A YAML document could not be parsed.
    #[cfg(feature = "yaml")]
    #[error("YAML parse error in {document}: {source}")]
    Yaml {
        /// The document that failed to parse.
        document: String,
        /// The underlying parser error.
        #[source]
        source: serde_yaml::Error,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_error_display() {
        let err = RangeError {
            parameter: "voltage".to_string(),
            value: 40.0,
            min: Some(0.0),
            max: Some(30.0),
        };
        assert_eq!(err.to_string(), "voltage value 40 is out of range [0, 30]");
    }

    #[test]
    fn range_error_display_unbounded() {
        let err = RangeError {
            parameter: "current".to_string(),
            value: -1.0,
            min: Some(0.0),
            max: None,
        };
        assert_eq!(err.to_string(), "current value -1 is out of range [0, inf]");
    }

    #[test]
    fn error_from_range_error() {
        let err: Error = RangeError {
            parameter: "voltage".to_string(),
            value: 1.0,
            min: None,
            max: Some(0.5),
        }
        .into();
        assert!(err.is_range());
        assert!(!err.is_connection());
    }

    #[test]
    fn not_connected_display() {
        let err = ConnectionError::NotConnected {
            state: DeviceState::Disconnected,
        };
        assert_eq!(
            err.to_string(),
            "device is not connected (state: disconnected)"
        );
    }

    #[test]
    fn connect_failed_preserves_cause() {
        use std::error::Error as _;

        let cause = Error::Transport(TransportError::ConnectionFailed("refused".into()));
        let err = ConnectionError::ConnectFailed(Box::new(cause));
        let source = err.source().map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("transport error: connection failed: refused")
        );
    }

    #[test]
    fn unknown_key_lists_allowed_keys() {
        let err = Error::UnknownKey {
            key: "power".to_string(),
            allowed: &["voltage", "current"],
        };
        assert_eq!(
            err.to_string(),
            "unknown key `power`; allowed: voltage, current"
        );
    }

    #[test]
    fn capability_missing_display() {
        let err = Error::CapabilityMissing {
            capability: Capability::PowerCycle,
        };
        assert!(err.is_capability_missing());
        assert_eq!(
            err.to_string(),
            "capability missing: power_cycle is not supported by this model"
        );
    }
}
