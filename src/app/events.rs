//! Outbound application events.
//!
//! The [`ControllerService`](super::service::ControllerService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  The shipped
//! adapter logs them; tests record them.

use crate::app::commands::MalformedReason;
use crate::fsm::ZoneMode;
use crate::safety::AlarmReason;
use crate::settings::LogLevel;

/// Structured events emitted by the controller core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The service started with this many zones and this identity.
    Started { zones: usize, index: Option<u16> },

    /// A zone moved between modes.
    ModeChanged {
        zone: &'static str,
        from: ZoneMode,
        to: ZoneMode,
    },

    /// A safety condition was found and corrected this tick.
    Alarm { zone: &'static str, reason: AlarmReason },

    SetpointChanged { zone: &'static str, from: i32, to: i32 },

    EnableChanged { zone: &'static str, enabled: bool },

    /// The negotiator claimed an index.
    IdentityResolved(u16),

    /// Verbosity changed (boot or addressed command).  The sink applies it.
    LogLevelChanged(LogLevel),

    /// A command meant for this controller could not be used.
    CommandRejected { topic: &'static str, reason: MalformedReason },

    /// An addressed restart was accepted.  The runtime performs it.
    RestartRequested,

    BusConnected,

    BusDisconnected,
}
