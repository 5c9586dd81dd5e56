//! FloorTherm firmware entry point.
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   ConsoleDisplay  │
//! │  (Sensor+Heater)   (EventSink)    (Settings)   (DisplayPort)   │
//! │  WifiAdapter       MqttBus ──▶ mqtt-poll thread ──▶ BUS_EVENTS │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           ControllerService (pure logic)               │    │
//! │  │  Zone FSM · Safety · Router · Identity · Scheduler     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use log::{info, warn};

use floortherm::adapters::device_id;
use floortherm::adapters::display::ConsoleDisplay;
use floortherm::adapters::hardware::HardwareAdapter;
use floortherm::adapters::log_sink::LogEventSink;
use floortherm::adapters::mqtt::{BusOptions, MqttBus};
use floortherm::adapters::nvs::NvsAdapter;
use floortherm::adapters::time::MonotonicClock;
use floortherm::adapters::wifi::{Credentials, WifiAdapter};
use floortherm::app::ports::{DisplayPort, HeaterPort, SettingsPort};
use floortherm::app::service::ControllerService;
use floortherm::bus::channels::{self, BusEvent};
use floortherm::bus::topics::Topics;
use floortherm::config::SystemConfig;
use floortherm::drivers::{hw_init, watchdog::Watchdog};
use floortherm::settings::Settings;

/// Loop idle between passes; bounds inbound message latency.
const LOOP_IDLE_MS: u64 = 20;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  FloorTherm v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();
    config.validate().map_err(|e| anyhow::anyhow!("{e}"))?;

    // ── 2. Peripherals: every heater low before anything else ─
    hw_init::init_peripherals().context("peripheral init")?;
    let mut hw = HardwareAdapter::new(&config);
    hw.all_off();

    // ── 3. Persisted settings ─────────────────────────────────
    let nvs = NvsAdapter::new(&config).context("NVS init")?;
    let settings = match nvs.load() {
        Ok(s) => {
            info!("Settings loaded from NVS");
            s
        }
        Err(e) => {
            warn!("Settings load failed ({}), using defaults", e);
            Settings::defaults_for(&config)
        }
    };

    // ── 4. Core ───────────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut sink = LogEventSink::new();
    let mut display = ConsoleDisplay::new(config.console_every_ticks);
    let mut app = ControllerService::new(config.clone(), settings);
    app.start(clock.uptime_ms(), &mut sink);
    app.refresh_temperatures(&mut hw);

    // ── 5. Network ────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let creds = Credentials::from_build_env().context("WiFi credentials")?;
    let mut wifi = WifiAdapter::new(peripherals.modem, sysloop, &creds)?;
    if let Err(e) = wifi.connect(clock.uptime_ms()) {
        warn!("WiFi: {} (running locally until the link comes up)", e);
    }

    let mac = device_id::read_mac();
    let client_id = device_id::client_id(config.hostname, &mac);
    let will_topic = Topics::new(&config.namespace).offline();
    let mut bus = MqttBus::connect(&BusOptions {
        broker_url: config.broker_url,
        client_id: &client_id,
        will_topic: &will_topic,
    })?;

    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    let tick_interval = u64::from(config.control_loop_interval_ms);
    let mut next_tick = clock.uptime_ms();

    loop {
        let now = clock.uptime_ms();

        while let Some(event) = channels::try_next() {
            match event {
                BusEvent::Connected => app.on_bus_connected(now, &mut bus, &mut sink),
                BusEvent::Disconnected => app.on_bus_disconnected(&mut sink),
                BusEvent::Message { topic, payload } => {
                    app.handle_message(&topic, &payload, now, &mut hw, &mut bus, &nvs, &mut sink);
                }
            }
        }

        if now >= next_tick {
            app.tick(&mut hw, &mut bus, &mut sink);
            display.render(app.zones());
            next_tick = now + tick_interval;
        }

        app.poll_timers(now, &mut bus, &nvs, &mut sink);
        wifi.poll(now);
        watchdog.feed();

        if app.take_restart_request() {
            app.prepare_restart(&mut hw, &nvs);
            warn!("Restarting");
            thread::sleep(Duration::from_millis(100));
            unsafe {
                esp_idf_svc::sys::esp_restart();
            }
        }

        thread::sleep(Duration::from_millis(LOOP_IDLE_MS));
    }
}
