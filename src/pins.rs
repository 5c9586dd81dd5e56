//! GPIO / peripheral pin assignments for the FloorTherm controller board
//! (ESP32-WROOM-32, five-zone carrier).
//!
//! Every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Zone thermistors: analog (ADC1)
// ---------------------------------------------------------------------------

/// NTC divider inputs on GPIO 32, 33, 34, 35, 36.
pub const ZONE_ADC_GPIOS: [i32; 5] = [32, 33, 34, 35, 36];
/// ADC1 channels matching [`ZONE_ADC_GPIOS`] (GPIO32=CH4 … GPIO36=CH0).
pub const ZONE_ADC_CHANNELS: [u32; 5] = [4, 5, 6, 7, 0];

// ---------------------------------------------------------------------------
// Heater relays: digital outputs (active HIGH)
// ---------------------------------------------------------------------------

pub const HEATER_GPIOS: [i32; 5] = [16, 17, 18, 19, 23];

// ---------------------------------------------------------------------------
// Heartbeat LED (on-board blue LED)
// ---------------------------------------------------------------------------

pub const HEARTBEAT_LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// I²C bus (SSD1306 status display)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
pub const DISPLAY_I2C_ADDR: u8 = 0x3C;
