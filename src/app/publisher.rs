//! Status and alarm publisher: the only code that turns zone state into
//! bus messages.
//!
//! Everything here is fire-and-forget.  A failed publish is logged and
//! dropped; the next periodic broadcast carries the state again.

use core::fmt::Write;

use log::{debug, warn};

use crate::bus::payload;
use crate::bus::topics::Topics;
use crate::fsm::zone::{Zone, ZoneTable};
use crate::safety::AlarmReason;

use super::ports::BusPort;

pub struct StatusPublisher {
    topics: Topics,
}

impl StatusPublisher {
    pub fn new(topics: Topics) -> Self {
        Self { topics }
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Every zone to `<ns>/status`.
    pub fn publish_full(&self, table: &ZoneTable, bus: &mut impl BusPort) {
        match payload::full_status_json(table.zones()) {
            Ok(json) => send(bus, &self.topics.status(), &json, false),
            Err(e) => warn!("status: serialize failed: {}", e),
        }
    }

    /// One zone to `<ns>/status/<zone>`.
    pub fn publish_zone(&self, zone: &Zone, bus: &mut impl BusPort) {
        match payload::zone_status_json(zone) {
            Ok(json) => send(bus, &self.topics.zone_status(zone.id()), &json, false),
            Err(e) => warn!("status/{}: serialize failed: {}", zone.id(), e),
        }
    }

    /// Alarm text to `<ns>/alarm/<zone>`.  Never retained.
    pub fn publish_alarm(&self, zone_id: &str, reason: AlarmReason, bus: &mut impl BusPort) {
        send(bus, &self.topics.alarm(zone_id), reason.message().as_bytes(), false);
    }

    /// Our instance index to `<ns>/online`, retained so late joiners see it.
    pub fn announce_identity(&self, index: u16, bus: &mut impl BusPort) {
        let mut text = heapless::String::<8>::new();
        let _ = write!(text, "{}", index);
        send(bus, &self.topics.online(), text.as_bytes(), true);
    }
}

fn send(bus: &mut impl BusPort, topic: &str, payload: &[u8], retain: bool) {
    match bus.publish(topic, payload, retain) {
        Ok(()) => debug!("publish {} ({} bytes)", topic, payload.len()),
        Err(e) => warn!("publish {} dropped: {}", topic, e),
    }
}
