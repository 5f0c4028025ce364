//! Mock board adapter for integration tests.
//!
//! Records every relay and indicator write so tests can assert on the
//! full output history without touching real GPIO.

use relaymod::app::events::AppEvent;
use relaymod::app::ports::{EventSink, InputPort, OutputPort};

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    /// Raw input word returned by the next `read_inputs`.
    pub raw: u16,
    pub outputs: Vec<u16>,
    pub indicators: Vec<u16>,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self {
            raw: 0,
            outputs: Vec::new(),
            indicators: Vec::new(),
        }
    }

    pub fn last_output(&self) -> Option<u16> {
        self.outputs.last().copied()
    }

    pub fn last_indicators(&self) -> Option<u16> {
        self.indicators.last().copied()
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl InputPort for MockBoard {
    fn read_inputs(&mut self) -> u16 {
        self.raw
    }
}

impl OutputPort for MockBoard {
    fn write_outputs(&mut self, bits: u16) {
        self.outputs.push(bits);
    }

    fn write_indicators(&mut self, bits: u16) {
        self.indicators.push(bits);
    }
}

// ── RecordingSink ────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
