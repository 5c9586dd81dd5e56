//! JSON status payloads.
//!
//! Both shapes carry the same four fields per zone, spelled the way
//! dashboards on the bus already expect them:
//!
//! ```json
//! {"CurrentTemp":71.8,"Enabled":true,"SetTemp":72,"Heating":false}
//! ```
//!
//! The full report is an object keyed by zone id, in configuration order.
//! A zone without a usable reading (no sample yet, or a failed ADC read)
//! reports `"CurrentTemp":null`, which parses back as `None`.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::fsm::zone::Zone;

/// One zone as seen on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneStatus {
    #[serde(rename = "CurrentTemp")]
    pub current_temp: Option<f32>,
    #[serde(rename = "Enabled")]
    pub enabled: bool,
    #[serde(rename = "SetTemp")]
    pub set_temp: i32,
    #[serde(rename = "Heating")]
    pub heating: bool,
}

impl From<&Zone> for ZoneStatus {
    fn from(z: &Zone) -> Self {
        Self {
            current_temp: Some(z.temperature()).filter(|t| t.is_finite()),
            enabled: z.enabled(),
            set_temp: z.setpoint(),
            heating: z.heating(),
        }
    }
}

/// Every zone, keyed by id.
pub struct FullStatus<'a>(pub &'a [Zone]);

impl Serialize for FullStatus<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for zone in self.0 {
            map.serialize_entry(zone.id(), &ZoneStatus::from(zone))?;
        }
        map.end()
    }
}

pub fn zone_status_json(zone: &Zone) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&ZoneStatus::from(zone))
}

pub fn full_status_json(zones: &[Zone]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&FullStatus(zones))
}
