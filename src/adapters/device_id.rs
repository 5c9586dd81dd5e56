//! Per-board identity derived from the factory MAC address.
//!
//! The MQTT client id is `<hostname>-xxyyzz` (last three MAC bytes, lower
//! hex), so two controllers on one broker never collide at the transport
//! level even before they have negotiated an instance index.

use core::fmt::Write;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

pub type ClientId = heapless::String<32>;

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: a fixed MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// `<hostname>-xxyyzz`.  A hostname too long for the buffer is cut short.
pub fn client_id(hostname: &str, mac: &MacAddress) -> ClientId {
    let mut id = ClientId::new();
    let room = id.capacity() - 7;
    let prefix = hostname.get(..hostname.len().min(room)).unwrap_or("");
    let _ = write!(id, "{}-{:02x}{:02x}{:02x}", prefix, mac[3], mac[4], mac[5]);
    id
}
