//! Zone temperature sensing: raw ADC sampling and the aggregating [`SensorHub`].
//!
//! The hub owns the per-zone ADC channel map and produces one averaged,
//! converted reading per zone each control tick.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (channels set up by hw_init).
//! On host/test: reads from per-zone atomics for injection.

pub mod temperature;

use core::sync::atomic::{AtomicU16, Ordering};

use log::warn;

use crate::config::{SystemConfig, ZONE_COUNT};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

/// Injected raw codes for host builds.  Midscale reads as 77 °F.
static SIM_ZONE_ADC: [AtomicU16; ZONE_COUNT] = [
    AtomicU16::new(2048),
    AtomicU16::new(2048),
    AtomicU16::new(2048),
    AtomicU16::new(2048),
    AtomicU16::new(2048),
];

/// Set the raw ADC code the simulated probe of `zone` returns.
pub fn sim_set_zone_adc(zone: usize, raw: u16) {
    if let Some(slot) = SIM_ZONE_ADC.get(zone) {
        slot.store(raw, Ordering::Relaxed);
    }
}

/// One zone's latest reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneReading {
    /// Averaged raw ADC code.
    pub raw: u16,
    pub fahrenheit: f32,
}

/// Averages and converts every zone probe.
pub struct SensorHub {
    channels: [u32; ZONE_COUNT],
    samples: u8,
    sample_delay_ms: u32,
    last: [ZoneReading; ZONE_COUNT],
}

impl SensorHub {
    pub fn new(config: &SystemConfig) -> Self {
        let initial = ZoneReading {
            raw: 2048,
            fahrenheit: temperature::raw_to_fahrenheit(2048),
        };
        Self {
            channels: config.zones.map(|z| z.adc_channel),
            samples: config.samples_per_reading.max(1),
            sample_delay_ms: config.sample_delay_ms,
            last: [initial; ZONE_COUNT],
        }
    }

    /// Read every zone: `samples` raw reads spaced `sample_delay_ms` apart,
    /// integer-averaged, then converted.  Bounded by
    /// `ZONE_COUNT * samples * sample_delay_ms`.
    ///
    /// A zone with any failed sample reads NaN, which the control rule
    /// treats as over the ceiling.
    pub fn read_all(&mut self) -> [ZoneReading; ZONE_COUNT] {
        for zone in 0..ZONE_COUNT {
            let mut sum: u32 = 0;
            let mut failed = false;
            for _ in 0..self.samples {
                match self.read_raw(zone) {
                    Some(raw) => sum += u32::from(raw),
                    None => failed = true,
                }
                self.sample_delay();
            }
            self.last[zone] = if failed {
                warn!("zone {}: ADC read failed", zone);
                ZoneReading { raw: 0, fahrenheit: f32::NAN }
            } else {
                let raw = (sum / u32::from(self.samples)) as u16;
                ZoneReading {
                    raw,
                    fahrenheit: temperature::raw_to_fahrenheit(raw),
                }
            };
        }
        self.last
    }

    #[cfg(target_os = "espidf")]
    fn read_raw(&self, zone: usize) -> Option<u16> {
        hw_init::adc1_read(self.channels[zone])
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw(&self, zone: usize) -> Option<u16> {
        let _ = self.channels[zone];
        Some(SIM_ZONE_ADC[zone].load(Ordering::Relaxed))
    }

    #[cfg(target_os = "espidf")]
    fn sample_delay(&self) {
        esp_idf_hal::delay::FreeRtos::delay_ms(self.sample_delay_ms);
    }

    // Host reads are instantaneous; skipping the delay keeps tests fast.
    #[cfg(not(target_os = "espidf"))]
    fn sample_delay(&self) {
        let _ = self.sample_delay_ms;
    }
}
