//! Hardware adapter: bridges the board to the domain port traits.
//!
//! Owns the [`SensorHub`], one [`HeaterRelay`] per zone and the heartbeat
//! LED, and exposes them through [`SensorPort`] and [`HeaterPort`].  This
//! is the only module that touches real peripherals; on host builds the
//! drivers underneath fall back to their simulation stubs.

use crate::app::ports::{HeaterPort, SensorPort};
use crate::config::{SystemConfig, ZONE_COUNT};
use crate::drivers::heater::{GpioOutput, HeaterRelay};
use crate::drivers::status_led::HeartbeatLed;
use crate::sensors::SensorHub;

pub struct HardwareAdapter {
    sensor_hub: SensorHub,
    heaters: [HeaterRelay<GpioOutput>; ZONE_COUNT],
    heartbeat: HeartbeatLed,
}

impl HardwareAdapter {
    /// Claim every zone relay (driven low) and the heartbeat LED.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            sensor_hub: SensorHub::new(config),
            heaters: config.zones.map(|z| HeaterRelay::new(GpioOutput(z.heater_gpio))),
            heartbeat: HeartbeatLed::new(),
        }
    }

    pub fn heater_on(&self, zone: usize) -> bool {
        self.heaters.get(zone).is_some_and(HeaterRelay::is_on)
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_temperatures(&mut self) -> [f32; ZONE_COUNT] {
        self.sensor_hub.read_all().map(|r| r.fahrenheit)
    }
}

// ── HeaterPort implementation ─────────────────────────────────

impl HeaterPort for HardwareAdapter {
    fn set_heater(&mut self, zone: usize, on: bool) {
        if let Some(relay) = self.heaters.get_mut(zone) {
            relay.set(on);
        }
    }

    fn all_off(&mut self) {
        for relay in &mut self.heaters {
            relay.set(false);
        }
    }

    fn set_heartbeat(&mut self, on: bool) {
        self.heartbeat.set(on);
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;
    use crate::drivers::hw_init::sim_gpio_level;
    use crate::pins;

    #[test]
    fn relays_follow_port_calls() {
        let config = SystemConfig::default();
        let mut hw = HardwareAdapter::new(&config);
        hw.set_heater(1, true);
        assert!(hw.heater_on(1));
        assert!(sim_gpio_level(pins::HEATER_GPIOS[1]));

        hw.all_off();
        assert!(!hw.heater_on(1));
        assert!(!sim_gpio_level(pins::HEATER_GPIOS[1]));

        hw.set_heater(ZONE_COUNT, true);
        assert!(!hw.heater_on(ZONE_COUNT));
    }
}
