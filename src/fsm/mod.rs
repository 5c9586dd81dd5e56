//! Per-zone heating state machine.
//!
//! ```text
//! ┌─────┐  below band   ┌─────────┐  above band  ┌──────┐
//! │ OFF │ ────────────▶ │ HEATING │ ───────────▶ │ IDLE │
//! └─────┘               └─────────┘ ◀─────────── └──────┘
//!    │                                below band    ▲
//!    └──────────────── in / above band ─────────────┘
//!
//! any mode ──▶ OFF   on ceiling, disable, or a setpoint/enable command
//! ```
//!
//! [`evaluate`] is the whole transition rule.  It is pure: it sees one
//! zone's inputs and returns the next mode and relay level.  The
//! [`zone::ZoneTable`] owns the zones and is the only writer of relay
//! outputs.

pub mod zone;

use crate::control::hysteresis::{BandAction, HysteresisBand};
use crate::safety::{self, AlarmReason};

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// Heating mode of one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ZoneMode {
    /// Not enabled, or forced off.
    #[default]
    Off = 0,
    /// Enabled and warm enough; relay de-energised.
    Idle = 1,
    /// Enabled and below the band; relay energised.
    Heating = 2,
}

impl ZoneMode {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Idle => "IDLE",
            Self::Heating => "HEATING",
        }
    }
}

impl core::fmt::Display for ZoneMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Transition rule
// ---------------------------------------------------------------------------

/// Everything the rule looks at for one zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneInputs {
    pub temperature: f32,
    pub setpoint: i32,
    pub enabled: bool,
    /// Relay level recorded on the previous write.
    pub heating: bool,
}

/// The rule's verdict for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub mode: ZoneMode,
    pub heating: bool,
    pub alarm: Option<AlarmReason>,
}

impl Decision {
    const fn off(alarm: Option<AlarmReason>) -> Self {
        Self {
            mode: ZoneMode::Off,
            heating: false,
            alarm,
        }
    }
}

/// Decide one zone's next mode and relay level.
///
/// Precedence: ceiling, then enable flag, then the hysteresis band.  In
/// the dead band the relay keeps its previous level and the mode follows
/// the relay.
pub fn evaluate(inputs: ZoneInputs, ceiling: f32, band: &HysteresisBand) -> Decision {
    if let Some(alarm) = safety::check_zone(inputs.temperature, ceiling, inputs.enabled, inputs.heating) {
        return Decision::off(Some(alarm));
    }
    if !inputs.enabled {
        return Decision::off(None);
    }
    let heating = match band.evaluate(inputs.temperature, inputs.setpoint) {
        BandAction::On => true,
        BandAction::Off => false,
        BandAction::Hold => inputs.heating,
    };
    Decision {
        mode: if heating { ZoneMode::Heating } else { ZoneMode::Idle },
        heating,
        alarm: None,
    }
}
