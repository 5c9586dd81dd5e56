//! Recording mocks for every port.
//!
//! Each mock keeps the full call history so tests can assert on what the
//! controller did without touching real GPIO, NVS or a broker.

use std::cell::RefCell;

use floortherm::app::events::AppEvent;
use floortherm::app::ports::{BusPort, ConfigError, EventSink, HeaterPort, SensorPort, SettingsPort};
use floortherm::config::ZONE_COUNT;
use floortherm::error::CommsError;
use floortherm::settings::Settings;

// ── Heater call record ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HeaterCall {
    Set { zone: usize, on: bool },
    AllOff,
    Heartbeat(bool),
}

// ── MockHardware ──────────────────────────────────────────────

/// Sensor inputs are set directly; relay writes are recorded.
pub struct MockHardware {
    pub temperatures: [f32; ZONE_COUNT],
    pub relays: [bool; ZONE_COUNT],
    pub calls: Vec<HeaterCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            temperatures: [72.0; ZONE_COUNT],
            relays: [false; ZONE_COUNT],
            calls: Vec::new(),
        }
    }

    pub fn set_temp(&mut self, zone: usize, fahrenheit: f32) {
        self.temperatures[zone] = fahrenheit;
    }

    pub fn heartbeats(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HeaterCall::Heartbeat(on) => Some(*on),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_temperatures(&mut self) -> [f32; ZONE_COUNT] {
        self.temperatures
    }
}

impl HeaterPort for MockHardware {
    fn set_heater(&mut self, zone: usize, on: bool) {
        self.relays[zone] = on;
        self.calls.push(HeaterCall::Set { zone, on });
    }

    fn all_off(&mut self) {
        self.relays = [false; ZONE_COUNT];
        self.calls.push(HeaterCall::AllOff);
    }

    fn set_heartbeat(&mut self, on: bool) {
        self.calls.push(HeaterCall::Heartbeat(on));
    }
}

// ── MockBus ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retain: bool,
}

#[allow(dead_code)]
impl Sent {
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.payload).unwrap_or("<binary>")
    }
}

pub struct MockBus {
    pub sent: Vec<Sent>,
    pub subscriptions: Vec<String>,
    pub offline: bool,
}

#[allow(dead_code)]
impl MockBus {
    pub fn new() -> Self {
        Self { sent: Vec::new(), subscriptions: Vec::new(), offline: false }
    }

    pub fn on(&self, topic: &str) -> Vec<&Sent> {
        self.sent.iter().filter(|s| s.topic == topic).collect()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

impl BusPort for MockBus {
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), CommsError> {
        if self.offline {
            return Err(CommsError::NotConnected);
        }
        self.sent.push(Sent { topic: topic.into(), payload: payload.to_vec(), retain });
        Ok(())
    }

    fn subscribe(&mut self, filter: &str) -> Result<(), CommsError> {
        if self.offline {
            return Err(CommsError::NotConnected);
        }
        self.subscriptions.push(filter.into());
        Ok(())
    }
}

// ── MockSettings ──────────────────────────────────────────────

/// In-memory settings store; counts saves.
pub struct MockSettings {
    pub stored: RefCell<Option<Settings>>,
    pub saves: RefCell<u32>,
}

#[allow(dead_code)]
impl MockSettings {
    pub fn new() -> Self {
        Self { stored: RefCell::new(None), saves: RefCell::new(0) }
    }

    pub fn last(&self) -> Option<Settings> {
        self.stored.borrow().clone()
    }

    pub fn save_count(&self) -> u32 {
        *self.saves.borrow()
    }
}

impl Default for MockSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsPort for MockSettings {
    fn load(&self) -> Result<Settings, ConfigError> {
        Ok(self.stored.borrow().clone().unwrap_or_default())
    }

    fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        *self.stored.borrow_mut() = Some(settings.clone());
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
