//! FloorTherm firmware library.
//!
//! Exposes the zone control core, the MQTT command protocol and the
//! adapters for integration testing. All ESP-IDF-specific code is guarded
//! by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod bus;
pub mod config;
pub mod error;
pub mod fsm;
pub mod safety;
pub mod scheduler;
pub mod settings;

pub mod adapters;
pub mod control;
pub mod drivers;
pub mod pins;
pub mod sensors;
