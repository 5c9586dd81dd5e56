//! Bus event channel.
//!
//! The MQTT client delivers connection events and messages on its own
//! poll thread.  That thread only copies them out; the control loop
//! drains them between ticks and is the sole writer of zone state.
//!
//! Messages queue in [`BUS_EVENTS`] and are dropped when it is full.
//! Session state goes through [`LINK_STATE`], a latest-value signal that
//! can never be crowded out by message traffic.
//!
//! ```text
//! ┌──────────────┐  BusEvent  ┌──────────────┐
//! │  mqtt-poll   │──────────▶│ Control Loop  │
//! │  (thread)    │            │ (single owner)│
//! └──────────────┘            └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use super::topics::{Topic, TOPIC_CAP};

/// Largest inbound payload kept.  Every command payload is a short
/// integer; anything larger (our own full-status echo, for one) is
/// dropped at the edge.
pub const PAYLOAD_CAP: usize = 64;

const DEPTH: usize = 16;

/// One event from the broker session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    Connected,
    Disconnected,
    Message {
        topic: Topic,
        payload: heapless::Vec<u8, PAYLOAD_CAP>,
    },
}

impl BusEvent {
    /// Copy an inbound message.  `None` when topic or payload does not fit.
    pub fn message(topic: &str, payload: &[u8]) -> Option<Self> {
        if topic.len() > TOPIC_CAP {
            return None;
        }
        let mut t = Topic::new();
        t.push_str(topic).ok()?;
        let payload = heapless::Vec::from_slice(payload).ok()?;
        Some(Self::Message { topic: t, payload })
    }
}

/// Poll thread → control loop, inbound messages.
pub static BUS_EVENTS: Channel<CriticalSectionRawMutex, BusEvent, DEPTH> = Channel::new();

/// Poll thread → control loop, latest session state (`true` = connected).
pub static LINK_STATE: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Hand an event to the control loop without blocking.  Session changes
/// always land; a message is dropped (and `false` returned) when the
/// channel is full.
pub fn post(event: BusEvent) -> bool {
    match event {
        BusEvent::Connected => {
            LINK_STATE.signal(true);
            true
        }
        BusEvent::Disconnected => {
            LINK_STATE.signal(false);
            true
        }
        msg @ BusEvent::Message { .. } => BUS_EVENTS.try_send(msg).is_ok(),
    }
}

/// Take the next event.  A pending session change comes before any
/// queued message.
pub fn try_next() -> Option<BusEvent> {
    match LINK_STATE.try_take() {
        Some(true) => Some(BusEvent::Connected),
        Some(false) => Some(BusEvent::Disconnected),
        None => BUS_EVENTS.try_receive().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // The channel is a process-wide static; tests that drain it take turns.
    static SERIAL: Mutex<()> = Mutex::new(());

    fn drain() {
        while try_next().is_some() {}
    }

    #[test]
    fn oversize_messages_are_refused() {
        assert!(BusEvent::message("floortherm/MBR/set", b"70").is_some());
        assert!(BusEvent::message("floortherm/status", &[b'x'; PAYLOAD_CAP + 1]).is_none());
        let long_topic = "t/".repeat(40);
        assert!(BusEvent::message(&long_topic, b"1").is_none());
    }

    #[test]
    fn events_come_out_in_order() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        drain();
        assert!(post(BusEvent::Connected));
        let msg = BusEvent::message("floortherm/get", b"").unwrap();
        assert!(post(msg.clone()));
        assert_eq!(try_next(), Some(BusEvent::Connected));
        assert_eq!(try_next(), Some(msg));
        assert_eq!(try_next(), None);
    }

    #[test]
    fn connect_survives_a_full_channel() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        drain();
        let online = BusEvent::message("floortherm/online", b"3").unwrap();
        for _ in 0..DEPTH {
            assert!(post(online.clone()));
        }
        assert!(!post(online.clone()));

        assert!(post(BusEvent::Connected));
        assert_eq!(try_next(), Some(BusEvent::Connected));
        assert_eq!(try_next(), Some(online));
        drain();
    }

    #[test]
    fn latest_session_state_wins() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        drain();
        assert!(post(BusEvent::Disconnected));
        assert!(post(BusEvent::Connected));
        assert_eq!(try_next(), Some(BusEvent::Connected));
        assert_eq!(try_next(), None);
    }
}
