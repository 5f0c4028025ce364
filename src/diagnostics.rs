//! Runtime diagnostics.
//!
//! Per-line debounce counters and cycle statistics, collected on demand.
//! Nothing here feeds back into the pipeline; it only observes.

use serde::{Deserialize, Serialize};

use crate::pipeline::Pipeline;
use crate::signal::CHANNELS;

/// Debounce bookkeeping of one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiagnostics {
    pub line: u8,
    pub stable: bool,
    pub filter_output: u8,
    pub debounce_ongoing: bool,
    pub debounce_duration: u16,
    pub raw_change_count: u16,
}

/// Snapshot collected for the diagnostics dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    pub cycle_count: u32,
    pub overruns: u32,
    pub cycle_period_ms: u16,
    /// Lines with an ongoing transient or a non-zero change count.
    pub lines: heapless::Vec<LineDiagnostics, CHANNELS>,
}

impl DiagnosticsReport {
    pub fn collect(pipeline: &Pipeline, overruns: u32) -> Self {
        let mut lines = heapless::Vec::new();
        for (i, ch) in pipeline.input().channels().iter().enumerate() {
            if !ch.debounce_ongoing && ch.raw_change_count == 0 {
                continue;
            }
            // Capacity equals the channel count.
            let _ = lines.push(LineDiagnostics {
                line: i as u8,
                stable: ch.stable_state,
                filter_output: ch.filter_output,
                debounce_ongoing: ch.debounce_ongoing,
                debounce_duration: ch.debounce_duration,
                raw_change_count: ch.raw_change_count,
            });
        }
        Self {
            cycle_count: pipeline.cycle_count(),
            overruns,
            cycle_period_ms: pipeline.cycle_period_ms(),
            lines,
        }
    }

    /// Line with the most raw toggles, if any toggled at all.
    pub fn noisiest_line(&self) -> Option<&LineDiagnostics> {
        self.lines
            .iter()
            .filter(|l| l.raw_change_count > 0)
            .max_by_key(|l| l.raw_change_count)
    }

    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}
