//! The documents under `config/` must always load.

use std::path::PathBuf;

use bot_config::{load_settings, load_snapshot, OptionalSetting};
use bot_core::{Feature, PlayerClass};

fn config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config")
}

#[test]
fn shipped_settings_load() {
    let settings = load_settings(&config_dir().join("settings.json")).unwrap();
    assert!(settings.features.is_active(Feature::SleepMode));
    assert!(settings.is_present(OptionalSetting::Farm));
    assert!(settings.sleep_window().unwrap().is_some());
    assert_eq!(settings.check_window(Feature::Expeditions).max_secs, 1800);
}

#[test]
fn shipped_snapshot_loads() {
    let snapshot = load_snapshot(&config_dir().join("snapshot.json")).unwrap();
    assert_eq!(snapshot.class, PlayerClass::Collector);
    assert_eq!(snapshot.celestials.len(), 2);
    assert_eq!(snapshot.galaxy.len(), 2);
}
