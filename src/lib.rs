//! RelayMod firmware library.
//!
//! Exposes the pure-logic modules (signal pipeline, register map, config,
//! application service) for integration testing and fuzzing.  Everything
//! here builds on the host; only `main.rs` and the link shims need ESP-IDF.

#![deny(unused_must_use)]

pub mod config;
pub mod cycle;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod registers;
pub mod signal;

pub mod adapters;
pub mod app;
pub mod drivers;
pub mod pins;

#[cfg(target_os = "espidf")]
mod esp_link_shims;
