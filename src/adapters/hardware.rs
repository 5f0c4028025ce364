//! Hardware adapter — bridges the GPIO banks to domain port traits.
//!
//! Owns the input bank, the relay bank and the indicator LED bank,
//! exposing them through [`InputPort`] and [`OutputPort`].  This is the
//! only module in the system that touches actual pins.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{InputPort, OutputPort};
use crate::drivers::input_bank::InputBank;
use crate::drivers::relay_bank::RelayBank;

/// Concrete adapter that combines all board I/O behind port traits.
pub struct BoardIo<I: InputPin, R: OutputPin, L: OutputPin> {
    inputs: InputBank<I>,
    relays: RelayBank<R>,
    leds: RelayBank<L>,
}

impl<I: InputPin, R: OutputPin, L: OutputPin> BoardIo<I, R, L> {
    pub fn new(inputs: InputBank<I>, relays: RelayBank<R>, leds: RelayBank<L>) -> Self {
        Self {
            inputs,
            relays,
            leds,
        }
    }

    /// Total GPIO failures seen so far (reads + writes).
    pub fn io_errors(&self) -> u32 {
        self.inputs
            .read_errors()
            .saturating_add(self.relays.write_errors())
            .saturating_add(self.leds.write_errors())
    }
}

// ── InputPort implementation ──────────────────────────────────

impl<I: InputPin, R: OutputPin, L: OutputPin> InputPort for BoardIo<I, R, L> {
    fn read_inputs(&mut self) -> u16 {
        self.inputs.sample()
    }
}

// ── OutputPort implementation ─────────────────────────────────

impl<I: InputPin, R: OutputPin, L: OutputPin> OutputPort for BoardIo<I, R, L> {
    fn write_outputs(&mut self, bits: u16) {
        self.relays.write(bits);
    }

    fn write_indicators(&mut self, bits: u16) {
        self.leds.write(bits);
    }
}
