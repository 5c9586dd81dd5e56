//! Property tests for the zone rule and the command router.
//!
//! Runs on host (x86_64) only; proptest is not available for ESP32 targets.
//! On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use floortherm::app::commands::AppCommand;
use floortherm::bus::router::{classify, parse_int};
use floortherm::config::SystemConfig;
use floortherm::control::hysteresis::HysteresisBand;
use floortherm::fsm::{evaluate, ZoneInputs, ZoneMode};
use proptest::prelude::*;

const CEILING: f32 = 90.0;
const BAND: HysteresisBand = HysteresisBand::new(0.5);

fn any_temperature() -> impl Strategy<Value = f32> {
    prop_oneof![
        8 => -40.0f32..140.0,
        1 => Just(f32::NAN),
        1 => Just(CEILING),
    ]
}

// ── Heater invariant ──────────────────────────────────────────

proptest! {
    /// No input ever leaves a relay on for a disabled zone or a zone at or
    /// above the ceiling.
    #[test]
    fn heater_never_on_when_unsafe(
        temperature in any_temperature(),
        setpoint in 40i32..=89,
        enabled in any::<bool>(),
        heating in any::<bool>(),
    ) {
        let d = evaluate(ZoneInputs { temperature, setpoint, enabled, heating }, CEILING, &BAND);
        if !enabled || temperature.is_nan() || temperature >= CEILING {
            prop_assert!(!d.heating);
            prop_assert_eq!(d.mode, ZoneMode::Off);
        }
        prop_assert_eq!(d.heating, d.mode == ZoneMode::Heating);
    }

    /// Inside the dead band the relay keeps whatever level it had.
    #[test]
    fn dead_band_holds_relay(
        setpoint in 40i32..=89,
        offset in -0.5f32..=0.5,
        heating in any::<bool>(),
    ) {
        let temperature = setpoint as f32 + offset;
        let d = evaluate(
            ZoneInputs { temperature, setpoint, enabled: true, heating },
            CEILING,
            &BAND,
        );
        prop_assert_eq!(d.heating, heating);
        prop_assert!(d.alarm.is_none());
    }

    /// Outside the band the decision ignores the previous relay level.
    #[test]
    fn outside_band_is_memoryless(
        setpoint in 40i32..=89,
        distance in 0.51f32..30.0,
        above in any::<bool>(),
    ) {
        let temperature = if above { setpoint as f32 + distance } else { setpoint as f32 - distance };
        prop_assume!(temperature < CEILING);
        let run = |heating| evaluate(
            ZoneInputs { temperature, setpoint, enabled: true, heating },
            CEILING,
            &BAND,
        );
        prop_assert_eq!(run(true), run(false));
        prop_assert_eq!(run(false).heating, !above);
    }
}

// ── Router totality ───────────────────────────────────────────

fn topic_under_namespace() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        Just("MBR".to_owned()),
        Just("set".to_owned()),
        Just("enable".to_owned()),
        Just("get".to_owned()),
        Just("sys".to_owned()),
        Just("log".to_owned()),
        Just("online".to_owned()),
        Just("status".to_owned()),
        "[a-zA-Z#+]{0,6}",
    ];
    proptest::collection::vec(segment, 0..5).prop_map(|segs| {
        let mut t = "floortherm".to_owned();
        for s in segs {
            t.push('/');
            t.push_str(&s);
        }
        t
    })
}

proptest! {
    /// Any topic and payload classifies without panicking, and any zone
    /// index produced is in range.
    #[test]
    fn classify_is_total(
        topic in prop_oneof![topic_under_namespace(), ".{0,80}"],
        payload in proptest::collection::vec(any::<u8>(), 0..80),
    ) {
        let config = SystemConfig::default();
        match classify(&topic, &payload, &config.namespace, &config.zones) {
            AppCommand::SetPoint { zone, .. }
            | AppCommand::Enable { zone, .. }
            | AppCommand::ZoneStatusRequest { zone } => {
                prop_assert!(zone < config.zones.len());
            }
            _ => {}
        }
    }

    /// Anything under `<ns>/status` is an echo, whatever the payload.
    #[test]
    fn status_subtree_always_echo(
        suffix in "(/[a-zA-Z0-9]{0,8}){0,4}",
        payload in proptest::collection::vec(any::<u8>(), 0..32),
    ) {
        let config = SystemConfig::default();
        let topic = format!("floortherm/status{suffix}");
        prop_assert_eq!(
            classify(&topic, &payload, &config.namespace, &config.zones),
            AppCommand::StatusEcho
        );
    }

    /// Every integer written in decimal parses back to itself.
    #[test]
    fn parse_int_accepts_any_i32(v in any::<i32>(), pad in "[ \t]{0,2}") {
        let text = format!("{pad}{v}{pad}");
        prop_assert_eq!(parse_int(text.as_bytes()), Some(v));
    }
}
