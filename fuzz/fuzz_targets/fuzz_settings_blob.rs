//! Fuzz target: persisted settings decoding
//!
//! Feeds arbitrary bytes through the NVS settings path.  A blob that is
//! not a valid `Settings` must come back as an error, never a panic, and
//! anything that does load must satisfy the setpoint range (bad setpoints
//! are reset on load).
//!
//! cargo fuzz run fuzz_settings_blob

#![no_main]

use floortherm::adapters::nvs::{NvsAdapter, SETTINGS_KEY, SETTINGS_NAMESPACE};
use floortherm::app::ports::{SettingsPort, StoragePort};
use floortherm::config::SystemConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mut nvs) = NvsAdapter::new(&SystemConfig::default()) else {
        return;
    };
    if nvs.write(SETTINGS_NAMESPACE, SETTINGS_KEY, data).is_err() {
        return;
    }
    if let Ok(settings) = nvs.load() {
        assert!(settings.setpoints.iter().all(|sp| (40..=89).contains(sp)));
    }
});
