//! Fuzz target: `router::classify` and `router::parse_int`
//!
//! The first byte picks a split point; the rest is cut into a topic and a
//! payload.  Classification must never panic and any zone index it yields
//! must address a configured zone.
//!
//! cargo fuzz run fuzz_router

#![no_main]

use floortherm::app::commands::AppCommand;
use floortherm::bus::router::{classify, parse_int};
use floortherm::config::SystemConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let (topic, payload) = rest.split_at(usize::from(split).min(rest.len()));
    let _ = parse_int(payload);

    let Ok(suffix) = core::str::from_utf8(topic) else {
        return;
    };
    let config = SystemConfig::default();

    // Half the corpus stays under the namespace so the zone arms get hit.
    for topic in [suffix.to_owned(), format!("floortherm/{suffix}")] {
        match classify(&topic, payload, &config.namespace, &config.zones) {
            AppCommand::SetPoint { zone, .. }
            | AppCommand::Enable { zone, .. }
            | AppCommand::ZoneStatusRequest { zone } => {
                assert!(zone < config.zones.len(), "zone index out of range");
            }
            _ => {}
        }
    }
});
