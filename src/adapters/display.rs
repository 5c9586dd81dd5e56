//! Console status table.
//!
//! Implements [`DisplayPort`] by printing the zone table to the log every
//! `console_every_ticks` renders.  A zone whose heater is on while it is
//! disabled, or at or above the ceiling, is flagged `!!! ERROR !!!`.
//!
//! ```text
//! ZONE  NAME              TEMP   SET  EN  MODE
//! MBR   Master Bedroom    71.8    72   1  HEATING
//! ```

use core::fmt::Write;

use log::info;

use crate::app::ports::DisplayPort;
use crate::fsm::zone::{Zone, ZoneTable};

pub type Row = heapless::String<96>;

pub struct ConsoleDisplay {
    every: u32,
    renders: u32,
    printed: u32,
}

impl ConsoleDisplay {
    /// `every == 0` is treated as 1.
    pub fn new(every: u32) -> Self {
        Self { every: every.max(1), renders: 0, printed: 0 }
    }

    /// Tables printed so far.
    pub fn printed(&self) -> u32 {
        self.printed
    }
}

/// Heater on where it never should be.
pub fn needs_attention(zone: &Zone, ceiling: f32) -> bool {
    let t = zone.temperature();
    zone.heating() && (!zone.enabled() || t.is_nan() || t >= ceiling)
}

pub fn format_row(zone: &Zone, ceiling: f32) -> Row {
    let mut row = Row::new();
    let _ = write!(
        row,
        "{:<5} {:<16} {:>5.1} {:>5} {:>3}  {}",
        zone.id(),
        zone.friendly_name(),
        zone.temperature(),
        zone.setpoint(),
        u8::from(zone.enabled()),
        zone.mode(),
    );
    if needs_attention(zone, ceiling) {
        let _ = row.push_str("  !!! ERROR !!!");
    }
    row
}

impl DisplayPort for ConsoleDisplay {
    fn render(&mut self, zones: &ZoneTable) {
        self.renders = self.renders.wrapping_add(1);
        if self.renders % self.every != 0 {
            return;
        }
        self.printed += 1;
        info!("ZONE  NAME              TEMP   SET  EN  MODE");
        for zone in zones.zones() {
            info!("{}", format_row(zone, zones.ceiling()));
        }
    }
}
