//! NTC thermistor conversion (10 kOhm @ 25 C, B = 3894).
//!
//! Each zone probe sits in a voltage divider with a fixed 10 kOhm reference
//! resistor on the supply side.  The Beta form of the Steinhart-Hart
//! equation turns the divider resistance into Kelvin, then Fahrenheit,
//! which is the unit every setpoint and status payload uses.
//!
//! The conversion is a total function: rails and out-of-model codes yield
//! whatever the equation yields (raw 0 lands on absolute zero).  Range
//! policing belongs to the control loop's ceiling check, not here.

/// Reference (fixed) divider resistor, ohms.
pub const R_REF: f32 = 10_000.0;
/// Thermistor Beta coefficient.
pub const BETA: f32 = 3894.0;
/// Nominal temperature, Kelvin (25 C).
pub const T0_K: f32 = 298.15;
/// Thermistor resistance at [`T0_K`], ohms.
pub const R0: f32 = 10_000.0;
/// Full-scale ADC code divisor (12-bit).
pub const ADC_MAX: f32 = 4096.0;
/// Divider supply voltage.
pub const V_SUPPLY: f32 = 3.3;

/// Convert an averaged raw ADC code into degrees Fahrenheit.
pub fn raw_to_fahrenheit(raw: u16) -> f32 {
    let v_out = f32::from(raw) * V_SUPPLY / ADC_MAX;
    let r_t = R_REF * v_out / (V_SUPPLY - v_out);
    let kelvin = 1.0 / (1.0 / T0_K + (r_t / R0).ln() / BETA);
    let celsius = kelvin - 273.15;
    celsius * 9.0 / 5.0 + 32.0
}
