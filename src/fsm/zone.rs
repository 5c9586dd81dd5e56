//! The zone table: single owner of every zone record and the only place
//! relay outputs are written.

use crate::app::ports::HeaterPort;
use crate::config::{SystemConfig, ZoneConfig, ZONE_COUNT};
use crate::control::hysteresis::HysteresisBand;
use crate::safety::{AlarmReason, SafetySupervisor};
use crate::settings::Settings;

use super::{evaluate, Decision, ZoneInputs, ZoneMode};

/// One heating zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    config: ZoneConfig,
    setpoint: i32,
    enabled: bool,
    temperature: f32,
    heating: bool,
    mode: ZoneMode,
}

impl Zone {
    fn new(config: ZoneConfig, setpoint: i32, enabled: bool) -> Self {
        Self {
            config,
            setpoint,
            enabled,
            temperature: f32::NAN,
            heating: false,
            mode: ZoneMode::Off,
        }
    }

    pub fn id(&self) -> &'static str {
        self.config.id
    }

    pub fn friendly_name(&self) -> &'static str {
        self.config.friendly_name
    }

    pub fn setpoint(&self) -> i32 {
        self.setpoint
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Last converted reading (°F); NaN before the first read.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Level last written to the relay.
    pub fn heating(&self) -> bool {
        self.heating
    }

    pub fn mode(&self) -> ZoneMode {
        self.mode
    }
}

/// What happened to one zone during a tick or a forced change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneOutcome {
    pub from: ZoneMode,
    pub to: ZoneMode,
    pub alarm: Option<AlarmReason>,
}

impl ZoneOutcome {
    pub fn mode_changed(&self) -> bool {
        self.from != self.to
    }
}

/// All zones, in configuration order.
pub struct ZoneTable {
    zones: [Zone; ZONE_COUNT],
    band: HysteresisBand,
    safety: SafetySupervisor,
}

impl ZoneTable {
    pub fn new(config: &SystemConfig, settings: &Settings) -> Self {
        let zones = core::array::from_fn(|i| {
            Zone::new(config.zones[i], settings.setpoints[i], settings.enabled[i])
        });
        Self {
            zones,
            band: HysteresisBand::new(config.hysteresis_half_band_f),
            safety: SafetySupervisor::new(config),
        }
    }

    pub fn zones(&self) -> &[Zone; ZONE_COUNT] {
        &self.zones
    }

    pub fn zone(&self, index: usize) -> Option<&Zone> {
        self.zones.get(index)
    }

    pub fn ceiling(&self) -> f32 {
        self.safety.ceiling()
    }

    /// Per-zone fault bitmask from the last tick.
    pub fn faults(&self) -> u8 {
        self.safety.faults()
    }

    /// Store fresh readings without deciding anything.
    pub fn update_temperatures(&mut self, readings: [f32; ZONE_COUNT]) {
        for (zone, t) in self.zones.iter_mut().zip(readings) {
            zone.temperature = t;
        }
    }

    /// Run the transition rule for every zone and write every relay.
    pub fn tick(&mut self, hw: &mut impl HeaterPort) -> [ZoneOutcome; ZONE_COUNT] {
        core::array::from_fn(|i| {
            let z = &self.zones[i];
            let from = z.mode;
            let inputs = ZoneInputs {
                temperature: z.temperature,
                setpoint: z.setpoint,
                enabled: z.enabled,
                heating: z.heating,
            };
            // The supervisor only tracks the fault mask; the verdict
            // itself comes from `evaluate`, which applies the same check.
            self.safety
                .evaluate(i, z.config.id, inputs.temperature, inputs.enabled, inputs.heating);
            let decision = evaluate(inputs, self.safety.ceiling(), &self.band);
            self.commit(i, decision, hw);
            ZoneOutcome {
                from,
                to: decision.mode,
                alarm: decision.alarm,
            }
        })
    }

    /// Change a setpoint and force the zone off.  `None` when the value is
    /// unchanged or the zone does not exist.
    pub fn apply_setpoint(&mut self, index: usize, setpoint: i32, hw: &mut impl HeaterPort) -> Option<ZoneOutcome> {
        let zone = self.zones.get_mut(index)?;
        if zone.setpoint == setpoint {
            return None;
        }
        zone.setpoint = setpoint;
        Some(self.force_off(index, hw))
    }

    /// Change an enable flag and force the zone off.  `None` when the flag
    /// is unchanged or the zone does not exist.
    pub fn apply_enabled(&mut self, index: usize, enabled: bool, hw: &mut impl HeaterPort) -> Option<ZoneOutcome> {
        let zone = self.zones.get_mut(index)?;
        if zone.enabled == enabled {
            return None;
        }
        zone.enabled = enabled;
        Some(self.force_off(index, hw))
    }

    /// De-energise every zone (shutdown / restart path).
    pub fn force_all_off(&mut self, hw: &mut impl HeaterPort) {
        for i in 0..ZONE_COUNT {
            self.force_off(i, hw);
        }
    }

    fn force_off(&mut self, index: usize, hw: &mut impl HeaterPort) -> ZoneOutcome {
        let from = self.zones[index].mode;
        let decision = Decision {
            mode: ZoneMode::Off,
            heating: false,
            alarm: None,
        };
        self.commit(index, decision, hw);
        ZoneOutcome {
            from,
            to: ZoneMode::Off,
            alarm: None,
        }
    }

    // ── The ONLY place a heater output is written ────────────────
    fn commit(&mut self, index: usize, decision: Decision, hw: &mut impl HeaterPort) {
        let zone = &mut self.zones[index];
        zone.mode = decision.mode;
        zone.heating = decision.heating;
        hw.set_heater(index, decision.heating);
    }
}
