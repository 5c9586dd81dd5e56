//! WiFi station-mode adapter.
//!
//! Brings the station interface up with credentials taken from the build
//! environment and keeps it up: a dropped link is retried from
//! [`WifiAdapter::poll`] on an exponential backoff (2 s → 4 s → 8 s …
//! capped at 60 s).  The control loop never waits on the network; while
//! the link is down zones keep running on local state.
//!
//! Every call returns immediately.  An attempt is started, then `poll`
//! checks the link until it is up or [`CONNECT_TIMEOUT_MS`] passes.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: the non-blocking `esp_idf_svc::wifi::EspWifi`.
//! - **all other targets**: a simulated link driven by tests.

use core::fmt;
use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    DriverInit,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (8-64 bytes, or empty for open)"),
            Self::DriverInit => write!(f, "WiFi driver init failed"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl std::error::Error for ConnectivityError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    /// Attempt `attempt` started; given up on at `deadline_ms`.
    Connecting { attempt: u32, deadline_ms: u64 },
    Connected,
    Reconnecting { attempt: u32, retry_at_ms: u64 },
}

/// How long one attempt may take before it counts as failed.
pub const CONNECT_TIMEOUT_MS: u64 = 15_000;

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl Credentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectivityError> {
        if ssid.is_empty() || !ssid.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
            return Err(ConnectivityError::InvalidSsid);
        }
        if !password.is_empty() && password.len() < 8 {
            return Err(ConnectivityError::InvalidPassword);
        }
        let mut creds = Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
        };
        creds.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        creds
            .password
            .push_str(password)
            .map_err(|_| ConnectivityError::InvalidPassword)?;
        Ok(creds)
    }

    /// Credentials baked in at build time, if any.
    pub fn from_build_env() -> Result<Self, ConnectivityError> {
        let (ssid, password) =
            crate::config::wifi_credentials().ok_or(ConnectivityError::NoCredentials)?;
        Self::new(ssid, password)
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// Backoff
// ───────────────────────────────────────────────────────────────

const MIN_BACKOFF_SECS: u32 = 2;
const MAX_BACKOFF_SECS: u32 = 60;

/// Doubling retry delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    secs: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self { secs: MIN_BACKOFF_SECS }
    }
}

impl Backoff {
    /// Delay to wait now; the following call returns double, up to the cap.
    pub fn next_delay_ms(&mut self) -> u64 {
        let now = self.secs;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
        u64::from(now) * 1_000
    }

    pub fn reset(&mut self) {
        self.secs = MIN_BACKOFF_SECS;
    }
}

// ───────────────────────────────────────────────────────────────
// Platform link
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod link {
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::modem::Modem;
    use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};
    use log::{debug, warn};

    use super::{ConnectivityError, Credentials};

    pub struct Link {
        wifi: EspWifi<'static>,
    }

    impl Link {
        pub fn new(
            modem: Modem,
            sysloop: EspSystemEventLoop,
            creds: &Credentials,
        ) -> Result<Self, ConnectivityError> {
            let mut wifi = EspWifi::new(modem, sysloop, None).map_err(|e| {
                warn!("WiFi: driver init failed: {e:?}");
                ConnectivityError::DriverInit
            })?;

            let auth_method = if creds.is_open() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            };
            wifi.set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: creds.ssid.as_str().try_into().map_err(|_| ConnectivityError::InvalidSsid)?,
                password: creds
                    .password
                    .as_str()
                    .try_into()
                    .map_err(|_| ConnectivityError::InvalidPassword)?,
                auth_method,
                ..Default::default()
            }))
            .map_err(|_| ConnectivityError::DriverInit)?;
            wifi.start().map_err(|_| ConnectivityError::DriverInit)?;
            Ok(Self { wifi })
        }

        /// Kick off association and return at once.
        pub fn begin_connect(&mut self) -> Result<(), ConnectivityError> {
            // Abandon any half-finished attempt first; not connected is fine.
            if let Err(e) = self.wifi.disconnect() {
                debug!("WiFi: disconnect before retry: {e:?}");
            }
            self.wifi.connect().map_err(|e| {
                warn!("WiFi: connect failed: {e:?}");
                ConnectivityError::ConnectionFailed
            })
        }

        /// Associated and the station netif has an address.
        pub fn is_up(&self) -> bool {
            self.wifi.is_connected().unwrap_or(false) && self.wifi.is_up().unwrap_or(false)
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod link {
    use super::{ConnectivityError, Credentials};

    pub struct Link {
        pub(super) up: bool,
        /// Number of upcoming attempts that never come up.
        pub(super) failures_pending: u32,
        pub(super) attempts: u32,
    }

    impl Link {
        pub fn new(_creds: &Credentials) -> Result<Self, ConnectivityError> {
            Ok(Self { up: false, failures_pending: 0, attempts: 0 })
        }

        pub fn begin_connect(&mut self) -> Result<(), ConnectivityError> {
            self.attempts += 1;
            if self.failures_pending > 0 {
                self.failures_pending -= 1;
                self.up = false;
            } else {
                self.up = true;
            }
            Ok(())
        }

        pub fn is_up(&self) -> bool {
            self.up
        }
    }
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    link: link::Link,
    ssid: heapless::String<32>,
    state: WifiState,
    backoff: Backoff,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: esp_idf_svc::hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        creds: &Credentials,
    ) -> Result<Self, ConnectivityError> {
        let link = link::Link::new(modem, sysloop, creds)?;
        Ok(Self::with_link(link, creds))
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(creds: &Credentials) -> Result<Self, ConnectivityError> {
        let link = link::Link::new(creds)?;
        Ok(Self::with_link(link, creds))
    }

    fn with_link(link: link::Link, creds: &Credentials) -> Self {
        Self {
            link,
            ssid: creds.ssid.clone(),
            state: WifiState::Disconnected,
            backoff: Backoff::default(),
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }

    /// Start the first attempt.  Completion is picked up by [`poll`](Self::poll);
    /// an error here means the attempt could not even be started and a
    /// retry is already scheduled.
    pub fn connect(&mut self, now_ms: u64) -> Result<(), ConnectivityError> {
        info!("WiFi: connecting to '{}'", self.ssid);
        self.attempt(0, now_ms)
    }

    /// Advance the connection state.  Never waits on the radio.
    pub fn poll(&mut self, now_ms: u64) {
        match self.state {
            WifiState::Connecting { attempt, deadline_ms } => {
                if self.link.is_up() {
                    self.state = WifiState::Connected;
                    self.backoff.reset();
                    info!("WiFi: connected to '{}'", self.ssid);
                } else if now_ms >= deadline_ms {
                    warn!("WiFi: attempt {} timed out", attempt + 1);
                    self.schedule_retry(attempt, now_ms);
                }
            }
            WifiState::Connected if !self.link.is_up() => {
                warn!("WiFi: link lost");
                self.schedule_retry(0, now_ms);
            }
            WifiState::Reconnecting { attempt, retry_at_ms } if now_ms >= retry_at_ms => {
                info!("WiFi: reconnect attempt {}", attempt + 2);
                let _ = self.attempt(attempt + 1, now_ms);
            }
            _ => {}
        }
    }

    fn attempt(&mut self, attempt: u32, now_ms: u64) -> Result<(), ConnectivityError> {
        match self.link.begin_connect() {
            Ok(()) => {
                self.state = WifiState::Connecting {
                    attempt,
                    deadline_ms: now_ms + CONNECT_TIMEOUT_MS,
                };
                Ok(())
            }
            Err(e) => {
                self.schedule_retry(attempt, now_ms);
                Err(e)
            }
        }
    }

    fn schedule_retry(&mut self, attempt: u32, now_ms: u64) {
        let delay = self.backoff.next_delay_ms();
        warn!("WiFi: retry in {} s", delay / 1_000);
        self.state = WifiState::Reconnecting { attempt, retry_at_ms: now_ms + delay };
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    pub fn sim_fail_next(&mut self, attempts: u32) {
        self.link.failures_pending = attempts;
    }

    pub fn sim_drop_link(&mut self) {
        self.link.up = false;
    }

    pub fn sim_attempts(&self) -> u32 {
        self.link.attempts
    }
}
