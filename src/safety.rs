//! Safety supervisor.
//!
//! Runs **every tick for every zone before the hysteresis band** is
//! consulted.  Two conditions override normal control:
//!
//! 1. **Overheat**: the zone reads at or above the hard ceiling.  The
//!    heater is forced off whatever the enable flag or setpoint say.
//! 2. **Unrequested heating**: the zone is disabled but its heater is
//!    still recorded as energised.  The heater is forced off.
//!
//! Both are corrected in the same tick they are detected and reported as
//! an alarm on every tick they hold.  The supervisor additionally keeps a
//! per-zone bitmask so the log only records the moment a fault appears or
//! clears, not every repetition.

use log::{error, info};

use crate::config::{SystemConfig, ZONE_COUNT};

const _: () = assert!(ZONE_COUNT <= 8, "zone fault mask is a u8");

/// Why a zone raised an alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmReason {
    Overheating,
    UnrequestedHeating,
}

impl AlarmReason {
    /// Free-text payload published on `<ns>/alarm/<zone>`.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Overheating => "OVERHEATING",
            Self::UnrequestedHeating => "Unrequested Heating!!!",
        }
    }
}

impl core::fmt::Display for AlarmReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Overheating => write!(f, "overheating"),
            Self::UnrequestedHeating => write!(f, "unrequested heating"),
        }
    }
}

/// Evaluate the override conditions for one zone.
///
/// A NaN reading is treated as over the ceiling: a probe that cannot be
/// converted must never keep a heater running.
pub fn check_zone(temperature: f32, ceiling: f32, enabled: bool, heating: bool) -> Option<AlarmReason> {
    if temperature.is_nan() || temperature >= ceiling {
        Some(AlarmReason::Overheating)
    } else if !enabled && heating {
        Some(AlarmReason::UnrequestedHeating)
    } else {
        None
    }
}

/// Safety supervisor.
pub struct SafetySupervisor {
    ceiling_f: f32,
    /// Zones with an alarm raised on the last evaluation.
    faults: u8,
}

impl SafetySupervisor {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            ceiling_f: config.overheat_ceiling_f,
            faults: 0,
        }
    }

    pub fn ceiling(&self) -> f32 {
        self.ceiling_f
    }

    /// Check one zone and record the outcome in the fault mask.
    pub fn evaluate(
        &mut self,
        zone: usize,
        zone_id: &str,
        temperature: f32,
        enabled: bool,
        heating: bool,
    ) -> Option<AlarmReason> {
        let verdict = check_zone(temperature, self.ceiling_f, enabled, heating);
        let mask = 1u8 << zone;
        match verdict {
            Some(reason) => {
                if self.faults & mask == 0 {
                    error!("SAFETY FAULT SET: {zone_id} {reason} ({temperature:.1}F)");
                }
                self.faults |= mask;
            }
            None => {
                if self.faults & mask != 0 {
                    info!("SAFETY FAULT CLEARED: {zone_id}");
                }
                self.faults &= !mask;
            }
        }
        verdict
    }

    /// Current per-zone fault bitmask (bit n = zone n).
    pub fn faults(&self) -> u8 {
        self.faults
    }
}
