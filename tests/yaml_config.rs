// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loading model tables from a configuration directory.

#![cfg(feature = "yaml")]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use psu_lib::adapter::SimAdapter;
use psu_lib::config::{ConfigLoader, YamlConfigLoader};
use psu_lib::strategy::{SimulationTiming, VirtualPsuStrategy};
use psu_lib::{Capability, ConfigError, Error, Psu};
use tempfile::TempDir;

const CAPABILITIES: &str = "\
BENCH-60V:
  set_voltage: true
  set_current_limit: true
  toggle_output: true
  power_cycle: false
  tracking: true
";

const RANGES: &str = "\
BENCH-60V:
  voltage: { min: 0.0, max: 60.0, unit: V }
  current: { min: 0.0 }
";

const MODELS: &str = "\
- model_id: BENCH-60V
  vendor: Bench Co
  channels: 2
  rack_units: 2
";

fn write_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

fn full_dir() -> TempDir {
    write_dir(&[
        ("capabilities.yml", CAPABILITIES),
        ("ranges.yml", RANGES),
        ("models.yml", MODELS),
    ])
}

#[test]
fn loads_all_three_tables() {
    let dir = full_dir();
    let loader = YamlConfigLoader::from_dir(dir.path()).unwrap();
    assert_eq!(loader.source(), Some(dir.path()));
    assert_eq!(loader.models(), ["BENCH-60V"]);

    let caps = loader.load_capabilities("BENCH-60V").unwrap();
    assert!(caps.supports(Capability::SetVoltage));
    assert!(!caps.supports(Capability::PowerCycle));
    assert!(caps.is_enabled("tracking"));

    let ranges = loader.load_ranges("BENCH-60V").unwrap();
    let current = ranges.get("current").unwrap();
    assert_eq!(current.min, Some(0.0));
    assert_eq!(current.max, None);
    assert!(current.contains(1_000.0));

    let info = loader.load_model_info("BENCH-60V").unwrap();
    assert_eq!(info.vendor.as_deref(), Some("Bench Co"));
    assert_eq!(info.channels, Some(2));
    assert_eq!(info.extra["rack_units"], 2);
}

#[test]
fn missing_models_file_is_allowed() {
    let dir = write_dir(&[("capabilities.yml", CAPABILITIES), ("ranges.yml", RANGES)]);
    let loader = YamlConfigLoader::from_dir(dir.path()).unwrap();
    assert!(loader.load_capabilities("BENCH-60V").is_ok());
    assert!(matches!(
        loader.load_model_info("BENCH-60V").unwrap_err(),
        ConfigError::UnknownModel { table: "models", .. }
    ));
}

#[test]
fn missing_ranges_file_is_io_error() {
    let dir = write_dir(&[("capabilities.yml", CAPABILITIES)]);
    let err = YamlConfigLoader::from_dir(dir.path()).unwrap_err();
    match err {
        ConfigError::Io { path, .. } => assert!(path.ends_with("ranges.yml")),
        other => panic!("expected I/O error, got {other}"),
    }
}

#[test]
fn malformed_document_is_yaml_error() {
    let dir = write_dir(&[
        ("capabilities.yml", CAPABILITIES),
        ("ranges.yml", "BENCH-60V:\n  voltage: { min: low }\n"),
    ]);
    let err = YamlConfigLoader::from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Yaml { ref document, .. } if document == "ranges.yml"));
}

#[test]
fn device_uses_directory_tables() {
    let dir = full_dir();
    let loader: Arc<dyn ConfigLoader> = Arc::new(YamlConfigLoader::from_dir(dir.path()).unwrap());
    let strategy = VirtualPsuStrategy::with_seed(8).with_timing(SimulationTiming::instant());
    let mut psu = Psu::with_strategy("BENCH-60V", SimAdapter::new(), loader, strategy).unwrap();

    psu.connect().unwrap();
    psu.set_voltage(48.0).unwrap();
    assert!(psu.set_voltage(61.0).unwrap_err().is_range());
    psu.set_current_limit(25.0).unwrap();
    assert!(psu.power_cycle().unwrap_err().is_capability_missing());
    assert_eq!(psu.model_info().unwrap().channels, Some(2));
}

#[test]
fn unknown_model_fails_construction() {
    let dir = full_dir();
    let loader: Arc<dyn ConfigLoader> = Arc::new(YamlConfigLoader::from_dir(dir.path()).unwrap());
    let err = Psu::new("BENCH-30V", SimAdapter::new(), loader).unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::UnknownModel { ref model, .. }) if model == "BENCH-30V"
    ));
}

#[test]
fn shipped_directory_matches_bundled_tables() {
    let shipped = Path::new(env!("CARGO_MANIFEST_DIR")).join("config");
    let from_dir = YamlConfigLoader::from_dir(&shipped).unwrap();
    let bundled = YamlConfigLoader::bundled().unwrap();
    assert_eq!(from_dir.models(), bundled.models());
    for model in bundled.models() {
        assert_eq!(
            from_dir.load_ranges(model).unwrap(),
            bundled.load_ranges(model).unwrap()
        );
    }
}
