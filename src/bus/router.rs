//! Command router: `(topic, payload)` → [`AppCommand`].
//!
//! Classification is total and side-effect free.  The topic is split into
//! borrowed segments; nothing is copied or mutated, so the same literal
//! topic can be fed in any number of times.
//!
//! Priority order (first match wins):
//!
//! 1. `<ns>/status[/...]`          → [`AppCommand::StatusEcho`]
//! 2. `<ns>/online`                → [`AppCommand::Identity`]
//! 3. `<ns>/sys/restart`           → [`AppCommand::Restart`]
//! 4. `<ns>/sys/log/<level>`       → [`AppCommand::SetLogLevel`]
//! 5. `<ns>/get`                   → [`AppCommand::StatusRequest`]
//! 6. `<ns>/<zone>/set`            → [`AppCommand::SetPoint`]
//! 7. `<ns>/<zone>/enable`         → [`AppCommand::Enable`]
//! 8. `<ns>/<zone>/get`            → [`AppCommand::ZoneStatusRequest`]
//! 9. anything else                → [`AppCommand::Unrecognized`]
//!
//! A recognised topic whose payload does not parse becomes
//! [`AppCommand::Malformed`].

use crate::app::commands::{AppCommand, MalformedReason};
use crate::config::ZoneConfig;
use crate::settings::LogLevel;

use super::topics::{ENABLE, GET, LOG, ONLINE, RESTART, SET, STATUS, SYS};

/// Deepest topic (below the namespace) any command uses.
const MAX_SEGMENTS: usize = 3;

/// Classify one inbound message.
pub fn classify(topic: &str, payload: &[u8], namespace: &str, zones: &[ZoneConfig]) -> AppCommand {
    let Some(rest) = topic
        .strip_prefix(namespace)
        .and_then(|r| r.strip_prefix('/'))
    else {
        return AppCommand::Unrecognized;
    };

    if rest.split('/').next() == Some(STATUS) {
        return AppCommand::StatusEcho;
    }

    let mut segments: heapless::Vec<&str, MAX_SEGMENTS> = heapless::Vec::new();
    for s in rest.split('/') {
        if segments.push(s).is_err() {
            return AppCommand::Unrecognized;
        }
    }

    let zone_of = |id: &str| zones.iter().position(|z| z.id == id);

    match segments.as_slice() {
        [ONLINE] => number(payload, "online", AppCommand::Identity),
        [SYS, RESTART] => number(payload, "sys/restart", |target| AppCommand::Restart { target }),
        [SYS, LOG, level] => match LogLevel::from_name(level) {
            Some(level) => number(payload, "sys/log", |target| AppCommand::SetLogLevel { level, target }),
            None => AppCommand::Malformed {
                topic: "sys/log",
                reason: MalformedReason::UnknownLogLevel,
                target: parse_int(payload),
            },
        },
        [GET] => AppCommand::StatusRequest,
        [zone, SET] => match zone_of(*zone) {
            Some(zone) => number(payload, "set", |value| AppCommand::SetPoint { zone, value }),
            None => AppCommand::Unrecognized,
        },
        [zone, ENABLE] => match zone_of(*zone) {
            Some(zone) => number(payload, "enable", |v| AppCommand::Enable { zone, enabled: v != 0 }),
            None => AppCommand::Unrecognized,
        },
        [zone, GET] => match zone_of(*zone) {
            Some(zone) => AppCommand::ZoneStatusRequest { zone },
            None => AppCommand::Unrecognized,
        },
        _ => AppCommand::Unrecognized,
    }
}

fn number(payload: &[u8], topic: &'static str, build: impl FnOnce(i32) -> AppCommand) -> AppCommand {
    match parse_int(payload) {
        Some(v) => build(v),
        None => AppCommand::Malformed {
            topic,
            reason: MalformedReason::NotANumber,
            target: None,
        },
    }
}

/// Parse an integer payload.
///
/// Accepts surrounding whitespace and a decimal form, which is truncated
/// toward zero (`"72.9"` → 72).  Anything else, including values outside
/// `i32`, is `None`.
pub fn parse_int(payload: &[u8]) -> Option<i32> {
    let text = core::str::from_utf8(payload).ok()?.trim();
    if let Ok(v) = text.parse::<i32>() {
        return Some(v);
    }
    let v = text.parse::<f64>().ok()?;
    let t = v.trunc();
    if t.is_finite() && t >= f64::from(i32::MIN) && t <= f64::from(i32::MAX) {
        Some(t as i32)
    } else {
        None
    }
}
