//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { cycle_period_ms } => {
                info!("START | cycle={}ms", cycle_period_ms);
            }
            AppEvent::InputsChanged { states, rise, fall } => {
                debug!(
                    "INPUT | states={:#06x} rise={:#06x} fall={:#06x}",
                    states, rise, fall
                );
            }
            AppEvent::OutputsChanged { from, to, physical } => {
                info!(
                    "STATE | out {:#06x} -> {:#06x} | relays={:016b}",
                    from, to, physical
                );
            }
            AppEvent::ConfigApplied => {
                info!("CONFIG | applied");
            }
            AppEvent::ConfigRejected(e) => {
                warn!("CONFIG | rejected: {}", e);
            }
            AppEvent::WriteRejected { addr, error } => {
                warn!(
                    "WRITE | addr={} rejected: {} (exception {:#04x})",
                    addr,
                    error,
                    error.exception_code()
                );
            }
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | in={:#06x} mix={:#06x} out={:#06x} relays={:#06x} | \
                     cycles={} overruns={}",
                    t.input_states,
                    t.mixer_states,
                    t.out_states,
                    t.physical,
                    t.cycle_count,
                    t.overruns,
                );
            }
            AppEvent::Diagnostics(d) => {
                info!(
                    "DIAG | cycles={} overruns={} noisy_lines={}",
                    d.cycle_count,
                    d.overruns,
                    d.lines.len()
                );
                for l in &d.lines {
                    debug!(
                        "DIAG | line {} stable={} filter={} ongoing={} dur={} changes={}",
                        l.line,
                        l.stable,
                        l.filter_output,
                        l.debounce_ongoing,
                        l.debounce_duration,
                        l.raw_change_count
                    );
                }
            }
        }
    }
}
