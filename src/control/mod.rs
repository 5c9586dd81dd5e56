//! Closed-loop control primitives.

pub mod hysteresis;
