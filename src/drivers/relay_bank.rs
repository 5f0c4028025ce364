//! Bank of digital outputs (relay coils or indicator LEDs).
//!
//! Generic over any `embedded-hal` 1.0 [`OutputPin`].  Bit *n* of the word
//! drives pin *n*.  Only pins whose level changes are touched.

use embedded_hal::digital::{OutputPin, PinState};
use heapless::Vec;
use log::warn;

use crate::error::IoError;
use crate::signal::CHANNELS;

pub struct RelayBank<P: OutputPin> {
    pins: Vec<P, CHANNELS>,
    latched: u16,
    write_errors: u32,
}

impl<P: OutputPin> RelayBank<P> {
    /// Drive every pin low and start from a known state.
    pub fn new(pins: Vec<P, CHANNELS>) -> Self {
        let mut bank = Self {
            pins,
            latched: 0,
            write_errors: 0,
        };
        bank.force(0);
        bank
    }

    fn drive(pin: &mut P, on: bool) -> Result<(), IoError> {
        pin.set_state(PinState::from(on))
            .map_err(|_| IoError::OutputWriteFailed)
    }

    fn force(&mut self, bits: u16) {
        for (i, pin) in self.pins.iter_mut().enumerate() {
            if Self::drive(pin, bits & (1 << i) != 0).is_err() {
                self.write_errors = self.write_errors.saturating_add(1);
            }
        }
        self.latched = bits;
    }

    /// Latch `bits`, writing only the pins that changed.
    pub fn write(&mut self, bits: u16) {
        let changed = bits ^ self.latched;
        if changed == 0 {
            return;
        }
        for (i, pin) in self.pins.iter_mut().enumerate() {
            let m = 1 << i;
            if changed & m == 0 {
                continue;
            }
            match Self::drive(pin, bits & m != 0) {
                Ok(()) => self.latched ^= m,
                Err(e) => {
                    self.write_errors = self.write_errors.saturating_add(1);
                    warn!("output {} write failed: {}", i, e);
                }
            }
        }
    }

    /// Word currently latched on the pins.
    pub fn latched(&self) -> u16 {
        self.latched
    }

    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }
}
