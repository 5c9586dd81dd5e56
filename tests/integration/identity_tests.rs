//! Instance index negotiation over the bus.

use floortherm::app::events::AppEvent;
use floortherm::app::service::ControllerService;
use floortherm::config::SystemConfig;
use floortherm::settings::Settings;

use super::mock_hw::{MockBus, MockHardware, MockSettings, RecordingSink};

struct Node {
    app: ControllerService,
    hw: MockHardware,
    bus: MockBus,
    store: MockSettings,
    sink: RecordingSink,
}

impl Node {
    fn boot(index: Option<u16>) -> Self {
        let config = SystemConfig::default();
        let mut settings = Settings::defaults_for(&config);
        settings.instance_index = index;
        let mut app = ControllerService::new(config, settings);
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

    fn connect(&mut self, now_ms: u64) {
        self.app.on_bus_connected(now_ms, &mut self.bus, &mut self.sink);
    }

    fn hear(&mut self, index: &str, now_ms: u64) {
        self.app.handle_message(
            "floortherm/online",
            index.as_bytes(),
            now_ms,
            &mut self.hw,
            &mut self.bus,
            &self.store,
            &mut self.sink,
        );
    }

    fn timers(&mut self, now_ms: u64) {
        self.app.poll_timers(now_ms, &mut self.bus, &self.store, &mut self.sink);
    }

    fn announcements(&self) -> Vec<String> {
        self.bus
            .on("floortherm/online")
            .iter()
            .map(|s| {
                assert!(s.retain, "identity broadcasts are retained");
                s.text().to_owned()
            })
            .collect()
    }
}

#[test]
fn connect_subscribes_whole_namespace() {
    let mut n = Node::boot(Some(0));
    n.connect(0);
    assert_eq!(n.bus.subscriptions, ["floortherm/#"]);
    assert!(n.sink.events.contains(&AppEvent::BusConnected));
}

#[test]
fn known_index_is_announced_at_once() {
    let mut n = Node::boot(Some(4));
    n.connect(100);
    assert_eq!(n.announcements(), ["4"]);
    assert_eq!(n.app.instance_index(), Some(4));
}

#[test]
fn first_boot_claims_one_above_highest_peer() {
    let mut n = Node::boot(None);
    n.connect(1_000);
    assert!(n.announcements().is_empty());

    // Retained announcements from peers arrive right after subscribing.
    n.hear("2", 1_050);
    n.hear("5", 1_100);
    n.hear("3", 1_200);

    n.timers(2_999);
    assert_eq!(n.app.instance_index(), None);

    n.timers(3_000);
    assert_eq!(n.app.instance_index(), Some(6));
    assert_eq!(n.announcements(), ["6"]);
    assert_eq!(n.store.last().and_then(|s| s.instance_index), Some(6));
    assert!(n.sink.events.contains(&AppEvent::IdentityResolved(6)));
}

#[test]
fn lone_controller_claims_zero() {
    let mut n = Node::boot(None);
    n.connect(0);
    n.timers(2_000);
    assert_eq!(n.app.instance_index(), Some(0));
    assert_eq!(n.announcements(), ["0"]);
}

#[test]
fn reconnect_during_window_keeps_original_deadline() {
    let mut n = Node::boot(None);
    n.connect(0);
    n.app.on_bus_disconnected(&mut n.sink);
    n.connect(1_500);
    assert_eq!(n.bus.subscriptions.len(), 2);

    n.timers(2_000);
    assert_eq!(n.app.instance_index(), Some(0));
}

#[test]
fn reconnect_after_resolution_reannounces() {
    let mut n = Node::boot(None);
    n.connect(0);
    n.hear("0", 100);
    n.timers(2_000);
    assert_eq!(n.app.instance_index(), Some(1));

    n.app.on_bus_disconnected(&mut n.sink);
    n.connect(10_000);
    assert_eq!(n.announcements(), ["1", "1"]);
}

#[test]
fn resolved_index_ignores_later_peers() {
    let mut n = Node::boot(Some(2));
    n.connect(0);
    n.hear("9", 10);
    n.hear("2", 20);
    n.timers(5_000);
    assert_eq!(n.app.instance_index(), Some(2));
    assert_eq!(n.store.save_count(), 0);
}

#[test]
fn malformed_announcements_are_ignored() {
    let mut n = Node::boot(None);
    n.connect(0);
    n.hear("seven", 10);
    n.hear("", 20);
    n.timers(2_000);
    assert_eq!(n.app.instance_index(), Some(0));
}
