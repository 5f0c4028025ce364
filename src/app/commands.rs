//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (field bus,
//! console, tests) that the [`ModuleService`](super::service::ModuleService)
//! executes between cycles.

use crate::config::ModuleConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Write one coil.
    WriteCoil { addr: u16, value: bool },

    /// Write one holding register.
    WriteRegister { addr: u16, value: u16 },

    /// Replace the whole configuration (validated first).
    ApplyConfig(Box<ModuleConfig>),

    /// Restore factory defaults.
    FactoryReset,

    /// Emit a telemetry event right away.
    RequestTelemetry,

    /// Emit a diagnostics report.
    RequestDiagnostics,
}
