// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `psu_lib` - Bench power supply control behind a uniform device abstraction.
//!
//! A [`Psu`] combines three pieces:
//!
//! - an [`Adapter`](adapter::Adapter) that opens and closes the transport,
//! - the model's [`Capabilities`] and [`Ranges`](types::Ranges), resolved by a
//!   [`ConfigLoader`](config::ConfigLoader),
//! - a [`PsuStrategy`](strategy::PsuStrategy) that carries out reads and
//!   writes, either simulated or against an instrument.
//!
//! The device only accepts commands while connected, refuses commands the
//! model does not support and rejects values outside the model's ranges.
//!
//! # Supported Features
//!
//! - **Lifecycle**: connect/disconnect state machine with scoped sessions
//! - **Setpoints**: voltage, current limit and output enable
//! - **Readings**: voltage, current, temperature and output state
//! - **Configuration**: YAML model tables or tables built in code
//! - **Simulation**: seeded noise and realistic settling delays
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use psu_lib::adapter::SimAdapter;
//! use psu_lib::config::YamlConfigLoader;
//! use psu_lib::strategy::{SimulationTiming, VirtualPsuStrategy};
//! use psu_lib::Psu;
//!
//! fn main() -> psu_lib::Result<()> {
//!     let loader = Arc::new(YamlConfigLoader::bundled()?);
//!     let strategy = VirtualPsuStrategy::new().with_timing(SimulationTiming::instant());
//!     let mut psu = Psu::with_strategy("RIGOL-DP832", SimAdapter::new(), loader, strategy)?;
//!
//!     let mut session = psu.session()?;
//!     session.set("voltage", 5.0)?;
//!     session.set("current_limit", 0.2)?;
//!     session.set("output", true)?;
//!     println!("{} V", session.read("voltage")?);
//!     session.close()
//! }
//! ```
//!
//! ## Runtime Selection
//!
//! ```no_run
//! use psu_lib::adapter::TcpAdapter;
//! use psu_lib::config::YamlConfigLoader;
//! use psu_lib::strategy::StrategyKind;
//! use psu_lib::Psu;
//!
//! fn main() -> psu_lib::Result<()> {
//!     let mut psu = Psu::builder("RIGOL-DP832")
//!         .with_adapter(TcpAdapter::new("192.168.1.60", TcpAdapter::SCPI_RAW_PORT))
//!         .with_loader(YamlConfigLoader::from_dir("config")?)
//!         .with_strategy_kind(StrategyKind::Real)
//!         .build()?;
//!
//!     psu.connect()?;
//!     psu.set_output(false)?;
//!     psu.disconnect()
//! }
//! ```
//!
//! # Logging
//!
//! The library emits [`tracing`] events and never installs a subscriber.

pub mod adapter;
mod capabilities;
pub mod config;
mod device;
pub mod error;
pub mod state;
pub mod strategy;
pub mod types;

pub use capabilities::{Capabilities, CapabilitiesBuilder, Capability};
pub use device::{DynPsu, Psu, PsuBuilder, PsuSession, PsuStatus};
pub use error::{
    ConfigError, ConnectionError, Error, RangeError, Result, TransportError, ValueError,
};
