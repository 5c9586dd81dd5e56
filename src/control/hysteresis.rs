//! On/off hysteresis band around a setpoint.
//!
//! ```text
//!   temp
//!    ▲
//!    │          ── off above sp + h ──
//!    │  sp + h  ┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄
//!    │  sp       dead band: keep output
//!    │  sp − h  ┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄
//!    │          ── on below sp − h ──
//! ```
//!
//! Both edges are strict: a reading exactly on `sp ± h` is inside the band.

/// What the band asks the relay to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandAction {
    /// Below the band: energise.
    On,
    /// Above the band: de-energise.
    Off,
    /// Inside the band: leave the output as it is.
    Hold,
}

/// Symmetric dead-band of `half_width` degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HysteresisBand {
    half_width: f32,
}

impl HysteresisBand {
    pub const fn new(half_width: f32) -> Self {
        Self { half_width }
    }

    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    pub fn evaluate(&self, temperature: f32, setpoint: i32) -> BandAction {
        let sp = setpoint as f32;
        if temperature < sp - self.half_width {
            BandAction::On
        } else if temperature > sp + self.half_width {
            BandAction::Off
        } else {
            BandAction::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges_are_inclusive_hold() {
        let band = HysteresisBand::new(0.5);
        assert_eq!(band.evaluate(69.5, 70), BandAction::Hold);
        assert_eq!(band.evaluate(70.5, 70), BandAction::Hold);
        assert_eq!(band.evaluate(70.0, 70), BandAction::Hold);
    }

    #[test]
    fn outside_band_switches() {
        let band = HysteresisBand::new(0.5);
        assert_eq!(band.evaluate(69.4, 70), BandAction::On);
        assert_eq!(band.evaluate(70.6, 70), BandAction::Off);
    }

    #[test]
    fn nan_holds() {
        // A NaN reading compares false both ways.
        let band = HysteresisBand::new(0.5);
        assert_eq!(band.evaluate(f32::NAN, 70), BandAction::Hold);
    }
}
