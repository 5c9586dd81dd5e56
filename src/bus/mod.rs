//! Message bus plumbing shared by the core and the MQTT adapter: topic
//! layout, inbound classification, JSON payloads and the hand-off channel.

pub mod channels;
pub mod payload;
pub mod router;
pub mod topics;
