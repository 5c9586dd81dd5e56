//! Bus commands end to end: topic + payload in, relays, settings and
//! publishes out.

use floortherm::app::events::AppEvent;
use floortherm::app::service::ControllerService;
use floortherm::config::SystemConfig;
use floortherm::fsm::ZoneMode;
use floortherm::settings::{LogLevel, Settings};

use super::mock_hw::{MockBus, MockHardware, MockSettings, RecordingSink};

struct Rig {
    app: ControllerService,
    hw: MockHardware,
    bus: MockBus,
    store: MockSettings,
    sink: RecordingSink,
}

fn rig(index: Option<u16>) -> Rig {
    let config = SystemConfig::default();
    let mut settings = Settings::defaults_for(&config);
    settings.instance_index = index;
    let mut app = ControllerService::new(config, settings);
    let mut sink = RecordingSink::new();
    app.start(0, &mut sink);
    Rig {
        app,
        hw: MockHardware::new(),
        bus: MockBus::new(),
        store: MockSettings::new(),
        sink,
    }
}

impl Rig {
    fn send(&mut self, topic: &str, payload: &str) {
        self.send_at(topic, payload, 1_000);
    }

    fn send_at(&mut self, topic: &str, payload: &str, now_ms: u64) {
        self.app.handle_message(
            topic,
            payload.as_bytes(),
            now_ms,
            &mut self.hw,
            &mut self.bus,
            &self.store,
            &mut self.sink,
        );
    }

    fn tick(&mut self) {
        self.app.tick(&mut self.hw, &mut self.bus, &mut self.sink);
    }
}

// ── Setpoint ──────────────────────────────────────────────────

#[test]
fn setpoint_is_applied_persisted_and_broadcast() {
    let mut r = rig(None);
    r.send("floortherm/NAV/set", "68");

    assert_eq!(r.app.settings().setpoints[1], 68);
    assert_eq!(r.app.zones().zones()[1].setpoint(), 68);
    assert_eq!(r.store.last().map(|s| s.setpoints[1]), Some(68));
    assert!(r.sink.events.contains(&AppEvent::SetpointChanged { zone: "NAV", from: 72, to: 68 }));

    let status = r.bus.on("floortherm/status");
    assert_eq!(status.len(), 1);
    assert!(status[0].text().contains(r#""NAV":{"CurrentTemp":"#));
    assert!(status[0].text().contains(r#""SetTemp":68"#));
}

#[test]
fn setpoint_change_restarts_status_period() {
    let mut r = rig(None);
    r.send_at("floortherm/MBR/set", "70", 45_000);
    assert_eq!(r.app.next_status_due(), Some(105_000));
}

#[test]
fn setpoint_change_forces_zone_off_until_next_tick() {
    let mut r = rig(None);
    r.send("floortherm/MBR/enable", "1");
    r.hw.set_temp(0, 65.0);
    r.tick();
    assert!(r.hw.relays[0]);

    r.send("floortherm/MBR/set", "80");
    assert!(!r.hw.relays[0]);
    assert_eq!(r.app.zones().zones()[0].mode(), ZoneMode::Off);

    r.tick();
    assert!(r.hw.relays[0]);
}

#[test]
fn out_of_range_setpoints_are_rejected() {
    let mut r = rig(None);
    for v in ["39", "90", "-5", "1000"] {
        r.send("floortherm/MBR/set", v);
    }
    assert_eq!(r.app.settings().setpoints[0], 72);
    assert_eq!(r.store.save_count(), 0);
    assert!(r.bus.sent.is_empty());
}

#[test]
fn range_limits_are_accepted() {
    let mut r = rig(None);
    r.send("floortherm/MBR/set", "40");
    r.send("floortherm/NAV/set", "89");
    assert_eq!(r.app.settings().setpoints[..2], [40, 89]);
}

#[test]
fn decimal_setpoint_is_truncated() {
    let mut r = rig(None);
    r.send("floortherm/OFC/set", "68.9");
    assert_eq!(r.app.settings().setpoints[2], 68);
}

#[test]
fn unchanged_setpoint_is_a_no_op() {
    let mut r = rig(None);
    r.send("floortherm/MBR/set", "72");
    assert_eq!(r.store.save_count(), 0);
    assert!(r.bus.sent.is_empty());
}

// ── Enable ────────────────────────────────────────────────────

#[test]
fn enable_and_disable() {
    let mut r = rig(None);
    r.hw.set_temp(4, 60.0);

    r.send("floortherm/MAV/enable", "7");
    assert!(r.app.settings().enabled[4]);
    assert!(r.sink.events.contains(&AppEvent::EnableChanged { zone: "MAV", enabled: true }));
    r.tick();
    assert!(r.hw.relays[4]);

    r.send("floortherm/MAV/enable", "0");
    assert!(!r.hw.relays[4]);
    assert!(!r.app.settings().enabled[4]);
    assert!(r.sink.events.contains(&AppEvent::ModeChanged {
        zone: "MAV",
        from: ZoneMode::Heating,
        to: ZoneMode::Off,
    }));
    assert_eq!(r.store.save_count(), 2);
}

// ── Queries ───────────────────────────────────────────────────

#[test]
fn status_request_publishes_full_status() {
    let mut r = rig(None);
    r.send("floortherm/get", "");
    assert_eq!(r.bus.on("floortherm/status").len(), 1);
    assert_eq!(r.store.save_count(), 0);
}

#[test]
fn zone_query_publishes_one_zone() {
    let mut r = rig(None);
    r.tick();
    r.send("floortherm/SMV/get", "");
    let sent = r.bus.on("floortherm/status/SMV");
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].text(),
        r#"{"CurrentTemp":72.0,"Enabled":false,"SetTemp":72,"Heating":false}"#
    );
}

// ── Ignored traffic ───────────────────────────────────────────

#[test]
fn echoes_foreign_and_malformed_traffic_change_nothing() {
    let mut r = rig(Some(0));
    for (topic, payload) in [
        ("floortherm/status", "{}"),
        ("floortherm/status/MBR", "{}"),
        ("floortherm/MBR/set", "warm"),
        ("floortherm/sys/log/loud", "0"),
        ("floortherm/XYZ/set", "70"),
        ("otherns/MBR/set", "70"),
        ("floortherm/MBR", "70"),
    ] {
        r.send(topic, payload);
    }
    assert!(r.bus.sent.is_empty());
    assert_eq!(r.store.save_count(), 0);
    assert_eq!(r.app.settings().setpoints, [72; 5]);
}

#[test]
fn unusable_commands_are_reported() {
    let mut r = rig(Some(0));
    r.send("floortherm/MBR/set", "warm");
    r.send("floortherm/sys/log/loud", "0");
    let rejected: Vec<_> = r
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::CommandRejected { .. }))
        .collect();
    assert_eq!(rejected.len(), 2);
}

#[test]
fn unknown_log_level_for_another_instance_is_silent() {
    let mut r = rig(Some(0));
    r.send("floortherm/sys/log/loud", "5");
    assert!(!r
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::CommandRejected { .. })));
    assert_eq!(r.app.settings().log_level, LogLevel::Info);
}

// ── Addressed system commands ────────────────────────────────

#[test]
fn restart_only_for_own_index() {
    let mut r = rig(Some(3));
    r.send("floortherm/sys/restart", "4");
    assert!(!r.app.take_restart_request());

    r.send("floortherm/sys/restart", "3");
    assert!(r.app.take_restart_request());
    assert!(!r.app.take_restart_request());
    assert!(r.sink.events.contains(&AppEvent::RestartRequested));
}

#[test]
fn restart_ignored_while_unresolved() {
    let mut r = rig(None);
    r.send("floortherm/sys/restart", "0");
    assert!(!r.app.take_restart_request());
}

#[test]
fn log_level_change_is_persisted() {
    let mut r = rig(Some(1));
    r.send("floortherm/sys/log/warning", "1");
    assert_eq!(r.app.settings().log_level, LogLevel::Warning);
    assert_eq!(r.store.last().map(|s| s.log_level), Some(LogLevel::Warning));
    assert_eq!(r.sink.events.last(), Some(&AppEvent::LogLevelChanged(LogLevel::Warning)));

    r.send("floortherm/sys/log/verbose", "2");
    assert_eq!(r.app.settings().log_level, LogLevel::Warning);
}
