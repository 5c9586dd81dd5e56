//! Controller service: the hexagonal core.
//!
//! [`ControllerService`] owns the zone table, the persisted settings, the
//! identity negotiator and the timers.  It is the single writer of zone
//! state: control ticks, timer expiries and bus messages all arrive here
//! one at a time from the control loop.  All I/O goes through port traits
//! passed in at each call.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────┐ ──▶ BusPort
//!                  │    ControllerService     │
//!   HeaterPort ◀── │ zones · identity · timers│ ──▶ EventSink
//!                  └──────────────────────────┘ ──▶ SettingsPort
//! ```

use log::{debug, info, trace, warn};

use crate::bus::router;
use crate::bus::topics::Topics;
use crate::config::{SystemConfig, ZONE_COUNT};
use crate::fsm::zone::{ZoneOutcome, ZoneTable};
use crate::scheduler::{Scheduler, TimerId};
use crate::settings::Settings;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::identity::{ConnectAction, IndexNegotiator, Observation};
use super::ports::{BusPort, EventSink, HeaterPort, SensorPort, SettingsPort};
use super::publisher::StatusPublisher;

pub struct ControllerService {
    config: SystemConfig,
    zones: ZoneTable,
    settings: Settings,
    negotiator: IndexNegotiator,
    publisher: StatusPublisher,
    scheduler: Scheduler,
    tick_count: u64,
    heartbeat: bool,
    restart_requested: bool,
}

impl ControllerService {
    /// Build the service from static config and loaded settings.
    ///
    /// Does **not** arm any timer; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig, settings: Settings) -> Self {
        let zones = ZoneTable::new(&config, &settings);
        let negotiator = IndexNegotiator::new(settings.instance_index);
        let publisher = StatusPublisher::new(Topics::new(&config.namespace));
        Self {
            config,
            zones,
            settings,
            negotiator,
            publisher,
            scheduler: Scheduler::new(),
            tick_count: 0,
            heartbeat: false,
            restart_requested: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        self.scheduler
            .arm_periodic(TimerId::StatusBroadcast, self.config.status_interval_ms(), now_ms);
        sink.emit(&AppEvent::Started {
            zones: ZONE_COUNT,
            index: self.negotiator.index(),
        });
        sink.emit(&AppEvent::LogLevelChanged(self.settings.log_level));
        info!(
            "ControllerService started: {} zones, index {:?}",
            ZONE_COUNT,
            self.negotiator.index()
        );
    }

    /// Sample every probe without running the transition rule (boot).
    pub fn refresh_temperatures(&mut self, hw: &mut impl SensorPort) {
        self.zones.update_temperatures(hw.read_temperatures());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One control cycle: read sensors → decide every zone → write relays
    /// → report mode changes and alarms.
    ///
    /// `hw` satisfies both [`SensorPort`] and [`HeaterPort`] so the sensor
    /// read and the relay writes share one borrow.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + HeaterPort),
        bus: &mut impl BusPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        self.zones.update_temperatures(hw.read_temperatures());
        let outcomes = self.zones.tick(hw);

        for (i, outcome) in outcomes.iter().enumerate() {
            let id = self.config.zones[i].id;
            self.report_mode_change(id, outcome, sink);
            if let Some(reason) = outcome.alarm {
                self.publisher.publish_alarm(id, reason, bus);
                sink.emit(&AppEvent::Alarm { zone: id, reason });
            }
        }

        self.heartbeat = !self.heartbeat;
        hw.set_heartbeat(self.heartbeat);
    }

    /// Act on every timer that has come due.
    pub fn poll_timers(
        &mut self,
        now_ms: u64,
        bus: &mut impl BusPort,
        store: &impl SettingsPort,
        sink: &mut impl EventSink,
    ) {
        for id in self.scheduler.poll(now_ms) {
            match id {
                TimerId::StatusBroadcast => {
                    debug!("periodic status broadcast");
                    self.publisher.publish_full(&self.zones, bus);
                }
                TimerId::IdentityWindow => {
                    if let Some(index) = self.negotiator.close_window() {
                        self.settings.instance_index = Some(index);
                        self.persist(store);
                        sink.emit(&AppEvent::IdentityResolved(index));
                        self.publisher.announce_identity(index, bus);
                    }
                }
            }
        }
    }

    // ── Bus lifecycle ─────────────────────────────────────────

    pub fn on_bus_connected(&mut self, now_ms: u64, bus: &mut impl BusPort, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::BusConnected);
        let filter = self.publisher.topics().wildcard();
        if let Err(e) = bus.subscribe(&filter) {
            warn!("subscribe {} failed: {}", filter, e);
        }
        match self.negotiator.on_connected() {
            ConnectAction::Announce(index) => self.publisher.announce_identity(index, bus),
            ConnectAction::OpenWindow => {
                self.scheduler.arm_once(
                    TimerId::IdentityWindow,
                    u64::from(self.config.identity_window_ms),
                    now_ms,
                );
            }
            ConnectAction::WindowAlreadyOpen => {}
        }
    }

    pub fn on_bus_disconnected(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::BusDisconnected);
    }

    // ── Command handling ──────────────────────────────────────

    /// Classify and act on one inbound message.  Never fails: anything
    /// unusable is logged and dropped.
    pub fn handle_message(
        &mut self,
        topic: &str,
        payload: &[u8],
        now_ms: u64,
        hw: &mut impl HeaterPort,
        bus: &mut impl BusPort,
        store: &impl SettingsPort,
        sink: &mut impl EventSink,
    ) {
        let cmd = router::classify(topic, payload, &self.config.namespace, &self.config.zones);
        if cmd == AppCommand::Unrecognized {
            debug!("ignoring {}", topic);
            return;
        }
        self.apply_command(cmd, now_ms, hw, bus, store, sink);
    }

    /// Act on an already-classified command.
    pub fn apply_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        hw: &mut impl HeaterPort,
        bus: &mut impl BusPort,
        store: &impl SettingsPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::StatusEcho | AppCommand::Unrecognized => {}

            AppCommand::Identity(peer) => match self.negotiator.observe(peer) {
                Observation::SelfEcho => trace!("identity: own broadcast {}", peer),
                Observation::Recorded => debug!("identity: peer {} heard", peer),
                Observation::Peer => debug!("identity: peer {} (already resolved)", peer),
            },

            AppCommand::Restart { target } => {
                if self.addressed(target) {
                    info!("restart requested");
                    self.restart_requested = true;
                    sink.emit(&AppEvent::RestartRequested);
                }
            }

            AppCommand::SetLogLevel { level, target } => {
                if self.addressed(target) {
                    self.settings.log_level = level;
                    self.persist(store);
                    sink.emit(&AppEvent::LogLevelChanged(level));
                }
            }

            AppCommand::StatusRequest => self.broadcast(now_ms, bus),

            AppCommand::SetPoint { zone, value } => {
                if !(self.config.min_setpoint_f..=self.config.max_setpoint_f).contains(&value) {
                    warn!(
                        "{}/set {} rejected: outside {}..={}",
                        self.config.zones[zone].id, value, self.config.min_setpoint_f, self.config.max_setpoint_f
                    );
                    return;
                }
                let from = self.settings.setpoints[zone];
                let Some(outcome) = self.zones.apply_setpoint(zone, value, hw) else {
                    return;
                };
                let id = self.config.zones[zone].id;
                self.settings.setpoints[zone] = value;
                sink.emit(&AppEvent::SetpointChanged { zone: id, from, to: value });
                self.after_zone_change(id, &outcome, now_ms, bus, store, sink);
            }

            AppCommand::Enable { zone, enabled } => {
                let Some(outcome) = self.zones.apply_enabled(zone, enabled, hw) else {
                    return;
                };
                let id = self.config.zones[zone].id;
                self.settings.enabled[zone] = enabled;
                sink.emit(&AppEvent::EnableChanged { zone: id, enabled });
                self.after_zone_change(id, &outcome, now_ms, bus, store, sink);
            }

            AppCommand::ZoneStatusRequest { zone } => {
                if let Some(z) = self.zones.zone(zone) {
                    self.publisher.publish_zone(z, bus);
                }
            }

            AppCommand::Malformed { topic, reason, target } => match target {
                Some(t) if !self.addressed(t) => debug!("{}: {} (for instance {})", topic, reason, t),
                _ => sink.emit(&AppEvent::CommandRejected { topic, reason }),
            },
        }
    }

    /// Persist, de-energise every zone and leave the restart itself to the
    /// runtime.
    pub fn prepare_restart(&mut self, hw: &mut impl HeaterPort, store: &impl SettingsPort) {
        self.persist(store);
        self.zones.force_all_off(hw);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    pub fn instance_index(&self) -> Option<u16> {
        self.negotiator.index()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// When the next unconditional status broadcast is due.
    pub fn next_status_due(&self) -> Option<u64> {
        self.scheduler.deadline(TimerId::StatusBroadcast)
    }

    /// Whether a restart was accepted.  Clears the flag.
    pub fn take_restart_request(&mut self) -> bool {
        core::mem::take(&mut self.restart_requested)
    }

    // ── Internal ──────────────────────────────────────────────

    fn addressed(&self, target: i32) -> bool {
        self.negotiator.index().is_some_and(|i| i32::from(i) == target)
    }

    fn report_mode_change(&self, zone: &'static str, outcome: &ZoneOutcome, sink: &mut impl EventSink) {
        if outcome.mode_changed() {
            sink.emit(&AppEvent::ModeChanged {
                zone,
                from: outcome.from,
                to: outcome.to,
            });
        }
    }

    fn after_zone_change(
        &mut self,
        zone: &'static str,
        outcome: &ZoneOutcome,
        now_ms: u64,
        bus: &mut impl BusPort,
        store: &impl SettingsPort,
        sink: &mut impl EventSink,
    ) {
        self.report_mode_change(zone, outcome, sink);
        self.broadcast(now_ms, bus);
        self.persist(store);
    }

    /// Full status now; the periodic timer counts from here.
    fn broadcast(&mut self, now_ms: u64, bus: &mut impl BusPort) {
        self.publisher.publish_full(&self.zones, bus);
        self.scheduler.restart(TimerId::StatusBroadcast, now_ms);
    }

    fn persist(&self, store: &impl SettingsPort) {
        if let Err(e) = store.save(&self.settings) {
            warn!("settings save failed: {}", e);
        }
    }
}
