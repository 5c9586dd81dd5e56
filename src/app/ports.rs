//! Port traits: the hexagonal boundary between the controller core and
//! the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControllerService (domain)
//! ```
//!
//! Sensors, relays, the message bus, persistent storage and the display
//! are all reached through these traits.  The
//! [`ControllerService`](super::service::ControllerService) takes them as
//! generic parameters at each call, so the whole core runs against mocks
//! on the host.

use crate::config::ZONE_COUNT;
use crate::error::CommsError;
use crate::fsm::zone::ZoneTable;
use crate::settings::Settings;

// ───────────────────────────────────────────────────────────────
// Sensor port (hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait SensorPort {
    /// One averaged, converted reading (°F) per zone, in zone order.
    fn read_temperatures(&mut self) -> [f32; ZONE_COUNT];
}

// ───────────────────────────────────────────────────────────────
// Heater port (domain → hardware)
// ───────────────────────────────────────────────────────────────

pub trait HeaterPort {
    /// Drive one zone relay.  Only the zone table calls this.
    fn set_heater(&mut self, zone: usize, on: bool);

    /// De-energise every relay.
    fn all_off(&mut self);

    /// Board activity LED.
    fn set_heartbeat(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Bus port (domain → broker)
// ───────────────────────────────────────────────────────────────

/// Outbound side of the message bus.  Publishing is fire-and-forget:
/// success means the message was queued, nothing more.
pub trait BusPort {
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), CommsError>;

    fn subscribe(&mut self, filter: &str) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The core reports what it did through structured
/// [`AppEvent`](super::events::AppEvent)s; the adapter decides where
/// they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Settings port (domain ↔ persisted settings)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the runtime [`Settings`].
///
/// Implementations validate before writing and reject out-of-range
/// values with [`ConfigError::ValidationFailed`] instead of clamping.
pub trait SettingsPort {
    /// Stored settings, or [`Settings::default()`] when nothing is stored.
    fn load(&self) -> Result<Settings, ConfigError>;

    fn save(&self, settings: &Settings) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (raw key-value blobs)
// ───────────────────────────────────────────────────────────────

/// Namespaced key-value storage.  Writes are atomic (NVS guarantees it on
/// target; the in-memory map trivially does).
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  `Ok(())` even if it did not exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Display port (domain → screen / console)
// ───────────────────────────────────────────────────────────────

/// Read-only consumer of the zone table.  Nothing in the core depends on
/// what it does.
pub trait DisplayPort {
    fn render(&mut self, zones: &ZoneTable);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`SettingsPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored blob failed to deserialize.
    Corrupted,
    /// A field failed range validation.
    ValidationFailed(&'static str),
    StorageFull,
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    NotFound,
    Full,
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "settings corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Full => Self::StorageFull,
            StorageError::NotFound | StorageError::IoError => Self::IoError,
        }
    }
}
