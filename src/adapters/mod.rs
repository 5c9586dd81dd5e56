//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements               | Connects to                |
//! |-------------|--------------------------|----------------------------|
//! | `hardware`  | SensorPort, HeaterPort   | ESP32 ADC1, GPIO relays    |
//! | `mqtt`      | BusPort                  | ESP-IDF MQTT client        |
//! | `nvs`       | SettingsPort, StoragePort| NVS / in-memory store      |
//! | `log_sink`  | EventSink                | Serial log output          |
//! | `display`   | DisplayPort              | Serial console table       |
//! | `wifi`      | –                        | ESP-IDF WiFi STA           |
//! | `time`      | –                        | ESP32 system timer         |
//! | `device_id` | –                        | eFuse MAC                  |

pub mod device_id;
pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod nvs;
pub mod time;
pub mod wifi;
