//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger (UART in production).  It also owns the global verbosity: a
//! [`AppEvent::LogLevelChanged`] is applied here with
//! `log::set_max_level`, so the core never touches the logger itself.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { zones, index } => {
                info!("START | zones={} index={:?}", zones, index);
            }
            AppEvent::ModeChanged { zone, from, to } => {
                info!("MODE  | {} {} -> {}", zone, from, to);
            }
            AppEvent::Alarm { zone, reason } => {
                error!("ALARM | {} {}", zone, reason.message());
            }
            AppEvent::SetpointChanged { zone, from, to } => {
                info!("SET   | {} {} -> {}", zone, from, to);
            }
            AppEvent::EnableChanged { zone, enabled } => {
                info!("ENABLE| {} {}", zone, if *enabled { "on" } else { "off" });
            }
            AppEvent::IdentityResolved(index) => {
                info!("IDENT | index {}", index);
            }
            AppEvent::LogLevelChanged(level) => {
                // Before applying: `silent` would swallow it.
                info!("LOG   | level {}", level);
                log::set_max_level(level.to_level_filter());
            }
            AppEvent::CommandRejected { topic, reason } => {
                warn!("CMD   | {} rejected: {}", topic, reason);
            }
            AppEvent::RestartRequested => {
                warn!("SYS   | restart requested");
            }
            AppEvent::BusConnected => {
                info!("BUS   | connected");
            }
            AppEvent::BusDisconnected => {
                warn!("BUS   | disconnected");
            }
        }
    }
}
