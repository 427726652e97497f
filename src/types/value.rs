// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dynamically typed values of the generic `read`/`set` surface.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// A reading or a setpoint exchanged through the generic key-based API.
///
/// Readings are numbers (`voltage`, `current`, `temp`) or flags (`output`).
/// `None` stands for an absent reading (a supply without a temperature
/// sensor) and for the empty argument of `power_cycle`.
///
/// # Examples
///
/// ```
/// use psu_lib::types::Value;
///
/// let v = Value::from(5.0);
/// assert_eq!(v.as_f64(), Some(5.0));
/// assert_eq!(Value::from(true).as_bool(), Some(true));
/// assert!(Value::None.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A numeric value.
    Number(f64),
    /// A boolean flag.
    Bool(bool),
    /// No value.
    #[default]
    None,
}

impl Value {
    /// Returns the numeric payload, if this is a number.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the flag payload, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns `true` if this is [`Value::None`].
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Extracts a finite number for the parameter `key`.
    pub(crate) fn expect_number(self, key: &'static str) -> Result<f64, ValueError> {
        let n = self.as_f64().ok_or(ValueError::TypeMismatch {
            key,
            expected: "number",
        })?;
        if n.is_finite() {
            Ok(n)
        } else {
            Err(ValueError::NotFinite { key, value: n })
        }
    }

    /// Extracts a flag for the parameter `key`.
    pub(crate) fn expect_bool(self, key: &'static str) -> Result<bool, ValueError> {
        self.as_bool().ok_or(ValueError::TypeMismatch {
            key,
            expected: "boolean",
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::None => write!(f, "none"),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Option<f64>> for Value {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::None, Self::Number)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        assert_eq!(Value::Number(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::Number(1.5).as_bool(), None);
        assert_eq!(Value::Bool(false).as_bool(), Some(false));
        assert_eq!(Value::None.as_f64(), None);
    }

    #[test]
    fn optional_reading_conversion() {
        assert_eq!(Value::from(Some(25.0)), Value::Number(25.0));
        assert_eq!(Value::from(None::<f64>), Value::None);
        assert_eq!(Value::from(()), Value::None);
    }

    #[test]
    fn expect_number_rejects_wrong_kind() {
        let err = Value::Bool(true).expect_number("voltage").unwrap_err();
        assert_eq!(
            err,
            ValueError::TypeMismatch {
                key: "voltage",
                expected: "number"
            }
        );
    }

    #[test]
    fn expect_number_rejects_non_finite() {
        assert!(matches!(
            Value::Number(f64::INFINITY).expect_number("voltage"),
            Err(ValueError::NotFinite { .. })
        ));
        assert!(Value::Number(f64::NAN).expect_number("voltage").is_err());
    }

    #[test]
    fn display() {
        assert_eq!(Value::Number(5.0).to_string(), "5");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::None.to_string(), "none");
    }

    #[test]
    fn serializes_untagged() {
        assert_eq!(serde_json::to_string(&Value::Number(0.2)).unwrap(), "0.2");
        assert_eq!(serde_json::to_string(&Value::Bool(true)).unwrap(), "true");
        assert_eq!(serde_json::to_string(&Value::None).unwrap(), "null");
    }
}
