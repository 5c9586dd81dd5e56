//! Runtime settings that survive a restart.
//!
//! Setpoints and enable flags are changed over the bus, the instance
//! index is claimed once by the negotiator, and the log verbosity is set
//! by an addressed command.  Everything else is static [`SystemConfig`].

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::config::{SystemConfig, ZONE_COUNT};

// ───────────────────────────────────────────────────────────────
// Log verbosity vocabulary
// ───────────────────────────────────────────────────────────────

/// Fixed, ordered verbosity vocabulary used on the bus
/// (`<ns>/sys/log/<name>`) and in persisted settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum LogLevel {
    Silent = 0,
    Fatal = 1,
    Error = 2,
    Warning = 3,
    #[default]
    Info = 4,
    Trace = 5,
    Verbose = 6,
}

impl LogLevel {
    pub const ALL: [Self; 7] = [
        Self::Silent,
        Self::Fatal,
        Self::Error,
        Self::Warning,
        Self::Info,
        Self::Trace,
        Self::Verbose,
    ];

    /// Topic-segment name (lowercase).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Trace => "trace",
            Self::Verbose => "verbose",
        }
    }

    /// Look up a level by its topic-segment name.  Case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.name() == name)
    }

    /// Map onto the `log` crate's filter.  `log` has no separate fatal
    /// level, so fatal shares the error filter.
    pub const fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Silent => log::LevelFilter::Off,
            Self::Fatal | Self::Error => log::LevelFilter::Error,
            Self::Warning => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Trace => log::LevelFilter::Debug,
            Self::Verbose => log::LevelFilter::Trace,
        }
    }
}

impl core::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ───────────────────────────────────────────────────────────────
// Settings
// ───────────────────────────────────────────────────────────────

/// Persisted controller state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Per-zone target temperature (°F), in zone order.
    pub setpoints: [i32; ZONE_COUNT],
    /// Per-zone heating permission, in zone order.
    pub enabled: [bool; ZONE_COUNT],
    /// Claimed instance index; `None` until negotiation resolves.
    pub instance_index: Option<u16>,
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self::defaults_for(&SystemConfig::default())
    }
}

impl Settings {
    /// First-boot settings: every zone at the default setpoint, disabled.
    pub fn defaults_for(config: &SystemConfig) -> Self {
        Self {
            setpoints: [config.default_setpoint_f; ZONE_COUNT],
            enabled: [false; ZONE_COUNT],
            instance_index: None,
            log_level: LogLevel::default(),
        }
    }

    /// Range-check before persisting.  Out-of-range values are rejected,
    /// never clamped.
    pub fn validate(&self, min_setpoint: i32, max_setpoint: i32) -> Result<(), ConfigError> {
        if self
            .setpoints
            .iter()
            .any(|sp| !(min_setpoint..=max_setpoint).contains(sp))
        {
            return Err(ConfigError::ValidationFailed(
                "setpoint outside the accepted range",
            ));
        }
        Ok(())
    }

    /// Replace every setpoint outside `min..=max` with `fallback`.  Returns
    /// the zones that were reset.
    pub fn reset_out_of_range(
        &mut self,
        min_setpoint: i32,
        max_setpoint: i32,
        fallback: i32,
    ) -> heapless::Vec<usize, ZONE_COUNT> {
        let mut reset = heapless::Vec::new();
        for (zone, sp) in self.setpoints.iter_mut().enumerate() {
            if !(min_setpoint..=max_setpoint).contains(sp) {
                *sp = fallback;
                let _ = reset.push(zone);
            }
        }
        reset
    }
}
