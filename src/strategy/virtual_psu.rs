// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simulated power supply physics.

use std::thread;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::Result;
use crate::strategy::{
    AMBIENT_TEMP, CURRENT_NOISE, PsuStrategy, SimulationTiming, StrategyContext, TEMP_NOISE,
    VOLTAGE_NOISE,
};
use crate::types::{millis, ReadKey, Value};

/// A power supply simulated in closed form.
///
/// While the output is on, readings are the setpoint (or ambient temperature)
/// plus uniform noise, floored at zero. While it is off every numeric reading
/// is zero. Writes sleep for the delays in [`SimulationTiming`].
///
/// # Examples
///
/// ```
/// use psu_lib::strategy::{PsuStrategy, SimulationTiming, VirtualPsuStrategy};
/// use psu_lib::types::{ReadKey, Value};
///
/// let mut psu = VirtualPsuStrategy::with_seed(7).with_timing(SimulationTiming::instant());
/// psu.set_voltage(12.0).unwrap();
/// assert_eq!(psu.read(ReadKey::Voltage).unwrap(), Value::Number(0.0));
///
/// psu.toggle_output(true).unwrap();
/// let v = psu.read(ReadKey::Voltage).unwrap().as_f64().unwrap();
/// assert!((v - 12.0).abs() <= 0.1 + 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct VirtualPsuStrategy {
    context: StrategyContext,
    timing: SimulationTiming,
    rng: ChaCha8Rng,
    voltage_setpoint: f64,
    current_limit: f64,
    output_on: bool,
    temperature: f64,
}

impl VirtualPsuStrategy {
    /// Creates a simulation seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self::from_rng(ChaCha8Rng::from_entropy())
    }

    /// Creates a simulation whose noise sequence is reproducible.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(rng: ChaCha8Rng) -> Self {
        Self {
            context: StrategyContext::default(),
            timing: SimulationTiming::default(),
            rng,
            voltage_setpoint: 0.0,
            current_limit: 0.0,
            output_on: false,
            temperature: AMBIENT_TEMP,
        }
    }

    /// Replaces the simulated delays.
    #[must_use]
    pub fn with_timing(mut self, timing: SimulationTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Returns the simulated delays.
    #[must_use]
    pub fn timing(&self) -> &SimulationTiming {
        &self.timing
    }

    /// Returns the attached model data.
    #[must_use]
    pub fn context(&self) -> &StrategyContext {
        &self.context
    }

    /// Returns `true` while the simulated output is enabled.
    #[must_use]
    pub fn is_output_on(&self) -> bool {
        self.output_on
    }

    fn noisy(&mut self, center: f64, amplitude: f64) -> f64 {
        let noise = self.rng.gen_range(-amplitude..=amplitude);
        (center + noise).max(0.0)
    }
}

impl Default for VirtualPsuStrategy {
    fn default() -> Self {
        Self::new()
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

impl PsuStrategy for VirtualPsuStrategy {
    fn attach(&mut self, context: StrategyContext) {
        self.context = context;
    }

    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    fn read(&mut self, key: ReadKey) -> Result<Value> {
        let value = match key {
            ReadKey::Output => Value::Bool(self.output_on),
            _ if !self.output_on => Value::Number(0.0),
            ReadKey::Voltage => Value::Number(self.noisy(self.voltage_setpoint, VOLTAGE_NOISE)),
            ReadKey::Current => Value::Number(self.noisy(self.current_limit, CURRENT_NOISE)),
            ReadKey::Temp => Value::Number(self.noisy(self.temperature, TEMP_NOISE)),
        };
        tracing::trace!(key = %key, value = %value, "Simulated reading");
        Ok(value)
    }

    fn set_voltage(&mut self, volts: f64) -> Result<()> {
        self.context.ranges().check("voltage", volts)?;
        tracing::debug!(volts, "Simulated voltage change");
        pause(self.timing.set_voltage_settle);
        self.voltage_setpoint = volts;
        Ok(())
    }

    fn set_current_limit(&mut self, amps: f64) -> Result<()> {
        self.context.ranges().check("current", amps)?;
        tracing::debug!(amps, "Simulated current limit change");
        self.current_limit = amps;
        Ok(())
    }

    fn toggle_output(&mut self, on: bool) -> Result<()> {
        tracing::debug!(on, "Simulated output toggle");
        if on && !self.output_on {
            pause(self.timing.output_on);
        }
        self.output_on = on;
        Ok(())
    }

    fn power_cycle(&mut self) -> Result<()> {
        tracing::debug!(
            off_ms = millis(self.timing.power_cycle),
            "Simulated power cycle"
        );
        self.output_on = false;
        pause(self.timing.power_cycle);
        self.output_on = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use super::*;
    use crate::capabilities::Capabilities;
    use crate::error::Error;
    use crate::types::{Range, Ranges};

    fn attached(seed: u64) -> VirtualPsuStrategy {
        let mut psu = VirtualPsuStrategy::with_seed(seed).with_timing(SimulationTiming::instant());
        psu.attach(StrategyContext::new(
            Arc::new(Capabilities::programmable()),
            Arc::new(
                Ranges::new()
                    .with("voltage", Range::new(0.0, 30.0))
                    .with("current", Range::new(0.0, 3.0)),
            ),
        ));
        psu
    }

    fn number(psu: &mut VirtualPsuStrategy, key: ReadKey) -> f64 {
        psu.read(key).unwrap().as_f64().unwrap()
    }

    #[test]
    fn output_off_reads_zero() {
        let mut psu = attached(1);
        psu.set_voltage(12.0).unwrap();
        psu.set_current_limit(1.0).unwrap();
        assert_eq!(number(&mut psu, ReadKey::Voltage), 0.0);
        assert_eq!(number(&mut psu, ReadKey::Current), 0.0);
        assert_eq!(number(&mut psu, ReadKey::Temp), 0.0);
        assert_eq!(psu.read(ReadKey::Output).unwrap(), Value::Bool(false));
    }

    #[test]
    fn readings_stay_within_noise() {
        let mut psu = attached(2);
        psu.set_voltage(5.0).unwrap();
        psu.set_current_limit(0.2).unwrap();
        psu.toggle_output(true).unwrap();
        for _ in 0..200 {
            assert!((number(&mut psu, ReadKey::Voltage) - 5.0).abs() <= VOLTAGE_NOISE + 1e-9);
            assert!((number(&mut psu, ReadKey::Current) - 0.2).abs() <= CURRENT_NOISE + 1e-9);
            assert!((number(&mut psu, ReadKey::Temp) - AMBIENT_TEMP).abs() <= TEMP_NOISE + 1e-9);
        }
    }

    #[test]
    fn readings_are_floored_at_zero() {
        let mut psu = attached(3);
        psu.toggle_output(true).unwrap();
        for _ in 0..200 {
            assert!(number(&mut psu, ReadKey::Voltage) >= 0.0);
            assert!(number(&mut psu, ReadKey::Current) >= 0.0);
        }
    }

    #[test]
    fn same_seed_same_noise() {
        let mut a = attached(42);
        let mut b = attached(42);
        for psu in [&mut a, &mut b] {
            psu.set_voltage(10.0).unwrap();
            psu.toggle_output(true).unwrap();
        }
        for _ in 0..10 {
            assert_eq!(
                a.read(ReadKey::Voltage).unwrap(),
                b.read(ReadKey::Voltage).unwrap()
            );
        }
    }

    #[test]
    fn out_of_range_is_rejected_and_not_applied() {
        let mut psu = attached(4);
        psu.set_voltage(3.0).unwrap();
        let err = psu.set_voltage(31.0).unwrap_err();
        assert!(matches!(err, Error::Range(ref e) if e.parameter == "voltage"));
        assert!(psu.set_current_limit(-0.5).unwrap_err().is_range());

        psu.toggle_output(true).unwrap();
        assert!((number(&mut psu, ReadKey::Voltage) - 3.0).abs() <= VOLTAGE_NOISE + 1e-9);
    }

    #[test]
    fn unattached_strategy_is_unbounded() {
        let mut psu = VirtualPsuStrategy::with_seed(5).with_timing(SimulationTiming::instant());
        psu.set_voltage(1000.0).unwrap();
    }

    #[test]
    fn power_cycle_ends_with_output_on() {
        let mut psu = attached(6).with_timing(
            SimulationTiming::instant().with_power_cycle(Duration::from_millis(30)),
        );
        let start = Instant::now();
        psu.power_cycle().unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert!(psu.is_output_on());
    }

    #[test]
    fn output_on_delay_only_on_rising_edge() {
        let mut psu = attached(7)
            .with_timing(SimulationTiming::instant().with_output_on(Duration::from_millis(40)));
        let start = Instant::now();
        psu.toggle_output(true).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(40));

        let start = Instant::now();
        psu.toggle_output(true).unwrap();
        psu.toggle_output(false).unwrap();
        assert!(start.elapsed() < Duration::from_millis(40));
    }

    #[test]
    fn set_voltage_settles() {
        let mut psu = attached(8).with_timing(
            SimulationTiming::instant().with_set_voltage_settle(Duration::from_millis(20)),
        );
        let start = Instant::now();
        psu.set_voltage(1.0).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
