//! Broker session errors.
//!
//! The decision core never fails: every inbound message and every sensor
//! value has a defined fallback.  Errors only exist at the adapter edge.
//! Storage and settings errors live beside their ports in
//! [`app::ports`](crate::app::ports); boot in `main` wraps everything in
//! `anyhow`.

use core::fmt;

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    MqttConnectFailed,
    MqttPublishFailed,
    MqttSubscribeFailed,
    /// The broker session is down; the message was dropped.
    NotConnected,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MqttConnectFailed => write!(f, "MQTT connect failed"),
            Self::MqttPublishFailed => write!(f, "MQTT publish failed"),
            Self::MqttSubscribeFailed => write!(f, "MQTT subscribe failed"),
            Self::NotConnected => write!(f, "not connected to broker"),
        }
    }
}

impl std::error::Error for CommsError {}
