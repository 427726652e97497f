// SPDX-License-Identifier: MPL-2.0

//! Simulated power supply walkthrough.
//!
//! Connects to a simulated Rigol DP832, applies a setpoint, reads it back and
//! power cycles the output. Delays are the realistic defaults, so the run
//! takes about six seconds.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example psu_demo
//!
//! # With a different bundled model and lifecycle logging
//! RUST_LOG=debug cargo run --example psu_demo -- KEYSIGHT-E36312A
//!
//! # With tables from a directory
//! cargo run --example psu_demo -- RIGOL-DP832 ./config
//! ```

use std::env;
use std::sync::Arc;

use psu_lib::adapter::SimAdapter;
use psu_lib::config::{ConfigLoader, YamlConfigLoader};
use psu_lib::strategy::VirtualPsuStrategy;
use psu_lib::{Capability, Psu};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let model = args.get(1).map_or("RIGOL-DP832", String::as_str);
    let loader: Arc<dyn ConfigLoader> = match args.get(2) {
        Some(dir) => Arc::new(YamlConfigLoader::from_dir(dir)?),
        None => Arc::new(YamlConfigLoader::bundled()?),
    };

    let mut psu = Psu::with_strategy(model, SimAdapter::new(), loader, VirtualPsuStrategy::new())?;
    if let Ok(info) = psu.model_info() {
        println!(
            "Model: {} ({})",
            info.model_id,
            info.description.as_deref().unwrap_or("no description")
        );
    }

    psu.connect()?;
    println!("State: {}", psu.get_state());
    println!("Capabilities:");
    for (name, enabled) in psu.capabilities().iter() {
        println!("  {name:<18} {enabled}");
    }

    if psu.capabilities().supports(Capability::SetVoltage) {
        psu.set("voltage", 5.0)?;
    }
    if psu.capabilities().supports(Capability::SetCurrentLimit) {
        psu.set("current_limit", 0.2)?;
    }
    psu.set("output", true)?;

    let v = psu.read_voltage()?;
    let i = psu.read_current()?;
    let t = psu.read_temp()?.unwrap_or(f64::NAN);
    println!(
        "Measured: V={v:.3}V, I={i:.3}A, T={t:.1}C, OUT={}",
        psu.read("output")?
    );

    if psu.capabilities().supports(Capability::PowerCycle) {
        psu.set("power_cycle", ())?;
        println!("After cycle, OUT={}", psu.read("output")?);
    } else {
        println!("{model} cannot power cycle");
    }

    psu.disconnect()?;
    println!("State: {}", psu.get_state());
    Ok(())
}
