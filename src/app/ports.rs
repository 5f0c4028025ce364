//! Port traits — the hexagonal boundary between the pipeline and the board.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ModuleService (domain)
//! ```
//!
//! Driven adapters (GPIO banks, event sinks, the field-bus transport)
//! implement these traits.  The [`ModuleService`](super::service::ModuleService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and runs unchanged under host tests.

use crate::registers::DataModel;

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Samples the raw input lines once per cycle.
pub trait InputPort {
    /// Bit *n* is the current level of input line *n* (1 = asserted).
    fn read_inputs(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Drives the relays and the per-input indicator LEDs.
pub trait OutputPort {
    /// Latch the physical relay word (already XOR-masked).
    fn write_outputs(&mut self, bits: u16);

    /// Update the input indicator LEDs.  Cosmetic only.
    fn write_indicators(&mut self, bits: u16);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Field-bus port (driving adapter: remote master → domain)
// ───────────────────────────────────────────────────────────────

/// Register-mapped server transport.
///
/// Called between cycles.  The transport decodes pending requests and
/// serves them against `model`; it must not hold on to the model across
/// calls.  Returns the number of requests served.
pub trait FieldBusPort {
    fn poll<M: DataModel>(&mut self, model: &mut M) -> usize;
}
