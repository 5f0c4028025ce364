//! Application core — pure domain logic, zero I/O.
//!
//! This module wires the signal pipeline to the outside world: reading
//! inputs, driving relays, serving the register map and reporting events.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod shared;
