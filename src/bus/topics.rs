//! Topic layout helpers.
//!
//! Every topic is rooted at the configured namespace `<ns>`:
//!
//! | Topic                  | Direction | Payload                    |
//! |------------------------|-----------|----------------------------|
//! | `<ns>/status`          | out       | full status JSON           |
//! | `<ns>/status/<zone>`   | out       | single-zone JSON           |
//! | `<ns>/alarm/<zone>`    | out       | alarm text                 |
//! | `<ns>/online`          | in + out  | instance index (retained)  |
//! | `<ns>/offline`         | will      | `1` (retained)             |
//! | `<ns>/get`             | in        | ignored                    |
//! | `<ns>/<zone>/set`      | in        | setpoint                   |
//! | `<ns>/<zone>/enable`   | in        | 0 / 1                      |
//! | `<ns>/<zone>/get`      | in        | ignored                    |
//! | `<ns>/sys/restart`     | in        | instance index             |
//! | `<ns>/sys/log/<level>` | in        | instance index             |

use core::fmt::Write;

use crate::settings::LogLevel;

/// Capacity of any single topic string.
pub const TOPIC_CAP: usize = 64;

pub type Topic = heapless::String<TOPIC_CAP>;

pub const STATUS: &str = "status";
pub const ALARM: &str = "alarm";
pub const ONLINE: &str = "online";
pub const OFFLINE: &str = "offline";
pub const GET: &str = "get";
pub const SET: &str = "set";
pub const ENABLE: &str = "enable";
pub const SYS: &str = "sys";
pub const RESTART: &str = "restart";
pub const LOG: &str = "log";

/// Builds the concrete topics for one namespace.
#[derive(Debug, Clone)]
pub struct Topics {
    namespace: heapless::String<32>,
}

impl Topics {
    pub fn new(namespace: &str) -> Self {
        let mut ns = heapless::String::new();
        let _ = ns.push_str(namespace);
        Self { namespace: ns }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn join(&self, segments: &[&str]) -> Topic {
        let mut topic = Topic::new();
        let _ = topic.push_str(&self.namespace);
        for s in segments {
            let _ = write!(topic, "/{s}");
        }
        topic
    }

    pub fn status(&self) -> Topic { self.join(&[STATUS]) }
    pub fn zone_status(&self, zone_id: &str) -> Topic { self.join(&[STATUS, zone_id]) }
    pub fn alarm(&self, zone_id: &str) -> Topic { self.join(&[ALARM, zone_id]) }
    pub fn online(&self) -> Topic { self.join(&[ONLINE]) }
    pub fn offline(&self) -> Topic { self.join(&[OFFLINE]) }
    pub fn status_request(&self) -> Topic { self.join(&[GET]) }

    pub fn zone_set(&self, zone_id: &str) -> Topic { self.join(&[zone_id, SET]) }
    pub fn zone_enable(&self, zone_id: &str) -> Topic { self.join(&[zone_id, ENABLE]) }
    pub fn zone_get(&self, zone_id: &str) -> Topic { self.join(&[zone_id, GET]) }

    pub fn restart(&self) -> Topic { self.join(&[SYS, RESTART]) }
    pub fn log_level(&self, level: LogLevel) -> Topic { self.join(&[SYS, LOG, level.name()]) }

    /// Subscription filter covering the whole namespace.
    pub fn wildcard(&self) -> Topic { self.join(&["#"]) }
}
