//! Control-loop behaviour of the `ControllerService` against mock ports:
//! sensor read → zone decisions → relays → status and alarm reports.

use floortherm::app::events::AppEvent;
use floortherm::app::service::ControllerService;
use floortherm::config::SystemConfig;
use floortherm::fsm::ZoneMode;
use floortherm::safety::AlarmReason;
use floortherm::settings::Settings;

use super::mock_hw::{MockBus, MockHardware, MockSettings, RecordingSink};

const MBR: usize = 0;
const OFC: usize = 2;

struct Rig {
    app: ControllerService,
    hw: MockHardware,
    bus: MockBus,
    store: MockSettings,
    sink: RecordingSink,
}

impl Rig {
    fn with(settings: impl FnOnce(&mut Settings)) -> Self {
        let config = SystemConfig::default();
        let mut s = Settings::defaults_for(&config);
        settings(&mut s);
        let mut app = ControllerService::new(config, s);
        let mut sink = RecordingSink::new();
        app.start(0, &mut sink);
        Self {
            app,
            hw: MockHardware::new(),
            bus: MockBus::new(),
            store: MockSettings::new(),
            sink,
        }
    }

    fn tick(&mut self) {
        self.app.tick(&mut self.hw, &mut self.bus, &mut self.sink);
    }

    fn send(&mut self, topic: &str, payload: &str, now_ms: u64) {
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
}

#[test]
fn start_reports_zone_count_and_log_level() {
    let rig = Rig::with(|_| {});
    assert_eq!(rig.sink.events[0], AppEvent::Started { zones: 5, index: None });
    assert!(rig.sink.events.contains(&AppEvent::LogLevelChanged(Default::default())));
    assert_eq!(rig.app.next_status_due(), Some(60_000));
}

#[test]
fn cold_enabled_zone_heats_until_band_top() {
    let mut rig = Rig::with(|s| s.enabled[MBR] = true);

    rig.hw.set_temp(MBR, 70.0);
    rig.tick();
    assert!(rig.hw.relays[MBR]);
    assert_eq!(rig.app.zones().zones()[MBR].mode(), ZoneMode::Heating);
    assert!(rig.sink.events.contains(&AppEvent::ModeChanged {
        zone: "MBR",
        from: ZoneMode::Off,
        to: ZoneMode::Heating,
    }));

    // Inside the band: relay holds.
    rig.hw.set_temp(MBR, 72.3);
    rig.tick();
    assert!(rig.hw.relays[MBR]);

    rig.hw.set_temp(MBR, 72.6);
    rig.tick();
    assert!(!rig.hw.relays[MBR]);
    assert_eq!(rig.app.zones().zones()[MBR].mode(), ZoneMode::Idle);
}

#[test]
fn disabled_zones_never_energise() {
    let mut rig = Rig::with(|_| {});
    rig.hw.temperatures = [50.0; 5];
    for _ in 0..3 {
        rig.tick();
    }
    assert_eq!(rig.hw.relays, [false; 5]);
}

#[test]
fn overheat_alarms_every_tick_and_cuts_relay() {
    let mut rig = Rig::with(|s| s.enabled[OFC] = true);
    rig.hw.set_temp(OFC, 60.0);
    rig.tick();
    assert!(rig.hw.relays[OFC]);

    rig.hw.set_temp(OFC, 90.0);
    rig.tick();
    rig.tick();
    assert!(!rig.hw.relays[OFC]);

    let alarms = rig.bus.on("floortherm/alarm/OFC");
    assert_eq!(alarms.len(), 2);
    assert_eq!(alarms[0].text(), "OVERHEATING");
    assert!(!alarms[0].retain);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::Alarm { zone: "OFC", reason: AlarmReason::Overheating })),
        2
    );
}

#[test]
fn unreadable_sensor_is_treated_as_overheat() {
    let mut rig = Rig::with(|s| s.enabled[MBR] = true);
    rig.hw.set_temp(MBR, f32::NAN);
    rig.tick();
    assert!(!rig.hw.relays[MBR]);
    assert_eq!(rig.bus.on("floortherm/alarm/MBR").len(), 1);
}

#[test]
fn heartbeat_toggles_each_tick() {
    let mut rig = Rig::with(|_| {});
    for _ in 0..4 {
        rig.tick();
    }
    assert_eq!(rig.hw.heartbeats(), [true, false, true, false]);
    assert_eq!(rig.app.tick_count(), 4);
}

#[test]
fn periodic_status_broadcast() {
    let mut rig = Rig::with(|_| {});
    rig.tick();

    rig.app.poll_timers(59_999, &mut rig.bus, &rig.store, &mut rig.sink);
    assert!(rig.bus.on("floortherm/status").is_empty());

    rig.app.poll_timers(60_000, &mut rig.bus, &rig.store, &mut rig.sink);
    let status = rig.bus.on("floortherm/status");
    assert_eq!(status.len(), 1);
    assert!(!status[0].retain);
    assert!(status[0].text().starts_with(r#"{"MBR":{"CurrentTemp":72"#));
    assert_eq!(rig.app.next_status_due(), Some(120_000));
}

#[test]
fn prepare_restart_persists_and_cuts_every_relay() {
    let mut rig = Rig::with(|s| s.enabled = [true; 5]);
    rig.hw.temperatures = [60.0; 5];
    rig.tick();
    assert_eq!(rig.hw.relays, [true; 5]);

    rig.app.prepare_restart(&mut rig.hw, &rig.store);
    assert_eq!(rig.hw.relays, [false; 5]);
    assert_eq!(rig.store.save_count(), 1);
    assert!(rig.app.zones().zones().iter().all(|z| z.mode() == ZoneMode::Off));
}

#[test]
fn publish_failures_do_not_disturb_control() {
    let mut rig = Rig::with(|s| s.enabled[MBR] = true);
    rig.bus.offline = true;
    rig.hw.set_temp(MBR, 95.0);
    rig.tick();
    assert!(!rig.hw.relays[MBR]);
    assert!(rig.bus.sent.is_empty());
}
