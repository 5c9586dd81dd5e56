//! System configuration parameters
//!
//! The static deployment description for one FloorTherm controller: which
//! zones exist, where their sensors and relays are wired, the topic root,
//! and every control-loop tunable.  Runtime-mutable state (setpoints,
//! enable flags, identity, verbosity) lives in [`Settings`](crate::settings::Settings)
//! instead and is persisted separately.

use crate::pins;

/// Number of heating zones wired to this board.
pub const ZONE_COUNT: usize = 5;

/// Longest zone id that still fits every topic buffer.
pub const MAX_ZONE_ID_LEN: usize = 16;

/// Topic segments owned by the controller itself.  A zone id must never
/// collide with one of these or the router could not tell them apart.
pub const RESERVED_SEGMENTS: [&str; 6] = ["status", "online", "offline", "alarm", "get", "sys"];

/// One heating zone: sensor input, relay output, and identity on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneConfig {
    /// Stable topic id (e.g. `MBR`).
    pub id: &'static str,
    /// Human-readable name for the console and display.
    pub friendly_name: &'static str,
    /// ADC1 channel of the zone thermistor divider.
    pub adc_channel: u32,
    /// GPIO driving the zone heater relay (active HIGH).
    pub heater_gpio: i32,
}

/// Core system configuration
#[derive(Debug, Clone)]
pub struct SystemConfig {
    // --- Identity / network ---
    /// DHCP hostname, also the MQTT client-id prefix.
    pub hostname: &'static str,
    /// Topic root shared by every controller on the bus.
    pub namespace: heapless::String<32>,
    /// MQTT broker URL.
    pub broker_url: &'static str,

    // --- Zones ---
    pub zones: [ZoneConfig; ZONE_COUNT],

    // --- Sensing ---
    /// Raw ADC samples averaged into one reading.
    pub samples_per_reading: u8,
    /// Delay between averaged samples (milliseconds).
    pub sample_delay_ms: u32,

    // --- Control ---
    /// Half-width of the hysteresis dead-band (°F).
    pub hysteresis_half_band_f: f32,
    /// Hard ceiling: at or above this every heater is forced off (°F).
    pub overheat_ceiling_f: f32,
    /// Lowest setpoint accepted from the bus (°F).
    pub min_setpoint_f: i32,
    /// Highest setpoint accepted from the bus (°F).
    pub max_setpoint_f: i32,
    /// Setpoint used for zones with nothing persisted (°F).
    pub default_setpoint_f: i32,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Unconditional full-status broadcast interval (seconds)
    pub status_interval_secs: u32,
    /// Identity negotiation listening window (milliseconds)
    pub identity_window_ms: u32,
    /// Console status table cadence (control ticks)
    pub console_every_ticks: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut namespace = heapless::String::new();
        let _ = namespace.push_str("floortherm");

        Self {
            hostname: "floortherm",
            namespace,
            broker_url: "mqtt://192.168.0.13:1883",

            zones: [
                ZoneConfig {
                    id: "MBR",
                    friendly_name: "Master Bedroom",
                    adc_channel: pins::ZONE_ADC_CHANNELS[0],
                    heater_gpio: pins::HEATER_GPIOS[0],
                },
                ZoneConfig {
                    id: "NAV",
                    friendly_name: "Bedroom 2",
                    adc_channel: pins::ZONE_ADC_CHANNELS[1],
                    heater_gpio: pins::HEATER_GPIOS[1],
                },
                ZoneConfig {
                    id: "OFC",
                    friendly_name: "Office",
                    adc_channel: pins::ZONE_ADC_CHANNELS[2],
                    heater_gpio: pins::HEATER_GPIOS[2],
                },
                ZoneConfig {
                    id: "SMV",
                    friendly_name: "Bedroom 3",
                    adc_channel: pins::ZONE_ADC_CHANNELS[3],
                    heater_gpio: pins::HEATER_GPIOS[3],
                },
                ZoneConfig {
                    id: "MAV",
                    friendly_name: "Bedroom 4",
                    adc_channel: pins::ZONE_ADC_CHANNELS[4],
                    heater_gpio: pins::HEATER_GPIOS[4],
                },
            ],

            // Sensing
            samples_per_reading: 10,
            sample_delay_ms: 10,

            // Control
            hysteresis_half_band_f: 0.5,
            overheat_ceiling_f: 90.0,
            min_setpoint_f: 40,
            max_setpoint_f: 89,
            default_setpoint_f: 72,

            // Timing
            control_loop_interval_ms: 1000, // 1 Hz
            status_interval_secs: 60,       // 1/min
            identity_window_ms: 2000,
            console_every_ticks: 10,
            watchdog_timeout_ms: 10_000,
        }
    }
}

/// A configuration field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidConfig(pub &'static str);

impl core::fmt::Display for InvalidConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "invalid config: {}", self.0)
    }
}

impl SystemConfig {
    /// Check the invariants the router and control loop rely on.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if self.namespace.is_empty() || self.namespace.contains(['+', '#']) {
            return Err(InvalidConfig("namespace must be non-empty and wildcard-free"));
        }
        for (i, zone) in self.zones.iter().enumerate() {
            if zone.id.is_empty() || zone.id.len() > MAX_ZONE_ID_LEN || zone.id.contains(['/', '+', '#']) {
                return Err(InvalidConfig("zone id must be a single non-empty topic segment"));
            }
            if RESERVED_SEGMENTS.contains(&zone.id) {
                return Err(InvalidConfig("zone id collides with a reserved topic segment"));
            }
            if self.zones[..i].iter().any(|other| other.id == zone.id) {
                return Err(InvalidConfig("zone ids must be unique"));
            }
        }
        if self.min_setpoint_f > self.max_setpoint_f {
            return Err(InvalidConfig("min_setpoint_f must be <= max_setpoint_f"));
        }
        if self.max_setpoint_f as f32 + self.hysteresis_half_band_f >= self.overheat_ceiling_f {
            return Err(InvalidConfig("setpoint band must stay below the overheat ceiling"));
        }
        if !(self.min_setpoint_f..=self.max_setpoint_f).contains(&self.default_setpoint_f) {
            return Err(InvalidConfig("default_setpoint_f must be inside the setpoint range"));
        }
        if self.hysteresis_half_band_f <= 0.0 {
            return Err(InvalidConfig("hysteresis_half_band_f must be positive"));
        }
        if self.control_loop_interval_ms == 0 || self.samples_per_reading == 0 {
            return Err(InvalidConfig("control interval and sample count must be non-zero"));
        }
        Ok(())
    }

    /// Index of the zone with the given topic id.
    pub fn zone_index(&self, id: &str) -> Option<usize> {
        self.zones.iter().position(|z| z.id == id)
    }

    /// Periodic status interval in milliseconds.
    pub fn status_interval_ms(&self) -> u64 {
        u64::from(self.status_interval_secs) * 1000
    }
}

/// WiFi credentials baked in at build time (`WIFI_SSID` / `WIFI_PASSWORD`).
pub fn wifi_credentials() -> Option<(&'static str, &'static str)> {
    match (option_env!("WIFI_SSID"), option_env!("WIFI_PASSWORD")) {
        (Some(ssid), Some(password)) => Some((ssid, password)),
        (Some(ssid), None) => Some((ssid, "")),
        _ => None,
    }
}
