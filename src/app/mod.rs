//! Application core: pure domain logic, zero I/O.
//!
//! Command handling, identity negotiation, status publishing and the
//! orchestration of the zone table.  Everything outside reaches this layer
//! through the **port traits** in [`ports`], so it runs unchanged against
//! mocks on the host.

pub mod commands;
pub mod events;
pub mod identity;
pub mod ports;
pub mod publisher;
pub mod service;
