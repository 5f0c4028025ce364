//! Saturating countdown timers used by the Output Stage (TDA / THO).
//!
//! A counter at 0 is expired and never ticks further.  Expiry is reported
//! exactly once: on the tick that takes the counter from 1 to 0.

use serde::{Deserialize, Serialize};

/// Largest tick count representable in a packed timer word (15 bits).
pub const MAX_TICKS: u16 = 0x7FFF;

/// Re-arm policy for a timer that is retriggered while still counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RestartMode {
    /// Keep counting; only an idle timer is loaded.
    #[default]
    Ignore,
    /// Always reload the configured ticks.
    Restart,
}

/// Static configuration of one timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Countdown length in cycles.  0 disables the timer.
    pub ticks: u16,
    pub mode: RestartMode,
}

impl TimerConfig {
    pub const fn new(ticks: u16, mode: RestartMode) -> Self {
        Self { ticks, mode }
    }

    pub const fn is_enabled(&self) -> bool {
        self.ticks > 0
    }
}

/// Runtime counter of one timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    remaining: u16,
}

impl Countdown {
    pub const fn remaining(&self) -> u16 {
        self.remaining
    }

    pub const fn is_running(&self) -> bool {
        self.remaining > 0
    }

    pub fn clear(&mut self) {
        self.remaining = 0;
    }

    /// Load the counter according to `cfg`.  Returns `true` when the counter
    /// was (re)loaded this call.
    pub fn arm(&mut self, cfg: TimerConfig) -> bool {
        if !cfg.is_enabled() {
            self.remaining = 0;
            return false;
        }
        if self.remaining == 0 || cfg.mode == RestartMode::Restart {
            self.remaining = cfg.ticks;
            true
        } else {
            false
        }
    }

    /// Advance one cycle.  Returns `true` only on the 1 -> 0 transition.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}
