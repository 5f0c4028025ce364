//! Outbound application events.
//!
//! The [`ModuleService`](super::service::ModuleService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::diagnostics::DiagnosticsReport;
use crate::error::{ConfigError, RegisterError};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started (carries the cycle period).
    Started { cycle_period_ms: u16 },

    /// At least one debounced input changed this cycle.
    InputsChanged { states: u16, rise: u16, fall: u16 },

    /// The published output word changed.
    OutputsChanged { from: u16, to: u16, physical: u16 },

    /// A new configuration was committed.
    ConfigApplied,

    /// A configuration update was refused; nothing changed.
    ConfigRejected(ConfigError),

    /// A single register or coil write was refused.
    WriteRejected { addr: u16, error: RegisterError },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// On-demand diagnostics dump.
    Diagnostics(DiagnosticsReport),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryData {
    pub input_states: u16,
    pub mixer_states: u16,
    pub out_states: u16,
    pub physical: u16,
    pub cycle_count: u32,
    pub overruns: u32,
}
