//! Inbound commands to the controller service.
//!
//! Every message that arrives on the bus is classified into exactly one
//! [`AppCommand`] by [`crate::bus::router::classify`] before the
//! [`ControllerService`](super::service::ControllerService) acts on it.

use crate::settings::LogLevel;

/// One classified bus message.  Variants are listed in the router's
/// priority order; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Anything under `<ns>/status`: our own or a peer's report.  Ignored.
    StatusEcho,

    /// A peer (or our own echo) announcing its instance index.
    Identity(i32),

    /// Restart, addressed to the instance with this index.
    Restart { target: i32 },

    /// Change verbosity, addressed to the instance with this index.
    SetLogLevel { level: LogLevel, target: i32 },

    /// Publish the full status now.
    StatusRequest,

    /// New setpoint (°F) for the zone at this index.
    SetPoint { zone: usize, value: i32 },

    /// New enable flag for the zone at this index.
    Enable { zone: usize, enabled: bool },

    /// Publish one zone's status now.
    ZoneStatusRequest { zone: usize },

    /// A recognised topic with an unusable payload or level name.
    /// `target` is the instance an addressed command named, when readable.
    Malformed {
        topic: &'static str,
        reason: MalformedReason,
        target: Option<i32>,
    },

    /// Not addressed to anything this controller understands.
    Unrecognized,
}

/// Why a recognised topic could not be acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// The payload is not a number.
    NotANumber,
    /// The `sys/log/<level>` suffix is not in the vocabulary.
    UnknownLogLevel,
}

impl core::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotANumber => write!(f, "payload is not a number"),
            Self::UnknownLogLevel => write!(f, "unknown log level"),
        }
    }
}
