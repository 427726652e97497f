// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Numeric bounds for adjustable parameters.
//!
//! Each model declares a [`Range`] per parameter (`voltage`, `current`, ...).
//! Either bound may be absent, meaning the parameter is unbounded on that
//! side. Bounds are inclusive.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RangeError;

/// An inclusive `{min, max}` bound on a numeric parameter.
///
/// # Examples
///
/// ```
/// use psu_lib::types::Range;
///
/// let volts = Range::new(0.0, 30.0).with_unit("V");
/// assert!(volts.contains(0.0));
/// assert!(volts.contains(30.0));
/// assert!(!volts.contains(30.01));
///
/// // Only a lower bound
/// let positive = Range::at_least(0.0);
/// assert!(positive.contains(1e9));
/// assert!(!positive.contains(-0.1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Range {
    /// Lower bound, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Display unit (`V`, `A`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Range {
    /// Creates a range bounded on both sides.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            unit: None,
        }
    }

    /// Creates a range with no bounds.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Creates a range with only a lower bound.
    #[must_use]
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            ..Self::default()
        }
    }

    /// Creates a range with only an upper bound.
    #[must_use]
    pub fn at_most(max: f64) -> Self {
        Self {
            max: Some(max),
            ..Self::default()
        }
    }

    /// Sets the display unit.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Returns `true` if `value` lies within the inclusive bounds.
    ///
    /// NaN is never contained.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    /// Checks `value` against the bounds of `parameter`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError`] if the value lies outside the bounds.
    pub fn check(&self, parameter: &str, value: f64) -> Result<(), RangeError> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(RangeError {
                parameter: parameter.to_string(),
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.unit.as_deref().unwrap_or("");
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(f, "{min}{unit}..{max}{unit}"),
            (Some(min), None) => write!(f, ">= {min}{unit}"),
            (None, Some(max)) => write!(f, "<= {max}{unit}"),
            (None, None) => write!(f, "unbounded"),
        }
    }
}

/// The numeric ranges of a power supply model, keyed by parameter name.
///
/// A parameter without an entry is unbounded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ranges {
    ranges: BTreeMap<String, Range>,
}

impl Ranges {
    /// Creates an empty table (every parameter unbounded).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the range of a parameter.
    #[must_use]
    pub fn with(mut self, parameter: impl Into<String>, range: Range) -> Self {
        self.ranges.insert(parameter.into(), range);
        self
    }

    /// Returns the range declared for `parameter`.
    #[must_use]
    pub fn get(&self, parameter: &str) -> Option<&Range> {
        self.ranges.get(parameter)
    }

    /// Checks `value` against the range of `parameter`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError`] if the parameter has a range and the value lies
    /// outside it, or if the value is NaN.
    pub fn check(&self, parameter: &str, value: f64) -> Result<(), RangeError> {
        match self.ranges.get(parameter) {
            Some(range) => range.check(parameter, value),
            None => Range::unbounded().check(parameter, value),
        }
    }

    /// Iterates over all declared ranges in parameter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Range)> {
        self.ranges.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of declared ranges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns `true` if no ranges are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl From<BTreeMap<String, Range>> for Ranges {
    fn from(ranges: BTreeMap<String, Range>) -> Self {
        Self { ranges }
    }
}

impl<'a> FromIterator<(&'a str, Range)> for Ranges {
    fn from_iter<I: IntoIterator<Item = (&'a str, Range)>>(iter: I) -> Self {
        Self {
            ranges: iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}
