//! Bank of digital input lines.
//!
//! Generic over any `embedded-hal` 1.0 [`InputPin`], so the same code reads
//! ESP-IDF `PinDriver`s on target and plain mocks on the host.  Line *n* of
//! the bank maps to bit *n* of the sampled word.

use embedded_hal::digital::InputPin;
use heapless::Vec;
use log::warn;

use crate::error::IoError;
use crate::signal::CHANNELS;

pub struct InputBank<P: InputPin> {
    pins: Vec<P, CHANNELS>,
    /// Lines wired through an opto-coupler read low when asserted.
    active_low_mask: u16,
    read_errors: u32,
}

impl<P: InputPin> InputBank<P> {
    pub fn new(pins: Vec<P, CHANNELS>, active_low_mask: u16) -> Self {
        Self {
            pins,
            active_low_mask,
            read_errors: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Sample every line.  A line that fails to read is reported as 0.
    pub fn sample(&mut self) -> u16 {
        let mut bits = 0u16;
        for (i, pin) in self.pins.iter_mut().enumerate() {
            match pin.is_high() {
                Ok(true) => bits |= 1 << i,
                Ok(false) => {}
                Err(_) => {
                    self.read_errors = self.read_errors.saturating_add(1);
                    warn!("input line {} read failed", i);
                }
            }
        }
        let lines = if self.pins.len() >= CHANNELS {
            u16::MAX
        } else {
            (1u16 << self.pins.len()) - 1
        };
        (bits ^ self.active_low_mask) & lines
    }

    /// Sample one line, propagating the pin error.
    pub fn read_line(&mut self, line: usize) -> Result<bool, IoError> {
        let pin = self.pins.get_mut(line).ok_or(IoError::InputReadFailed)?;
        let high = pin.is_high().map_err(|_| IoError::InputReadFailed)?;
        Ok(high ^ (self.active_low_mask & (1 << line) != 0))
    }

    pub fn read_errors(&self) -> u32 {
        self.read_errors
    }
}
