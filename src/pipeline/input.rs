//! Input Stage: per-line exponential debounce with hysteresis.
//!
//! Each line runs a fixed-point moving average toward 0 or 255, then a
//! dead-band comparator turns the smoothed value into a stable bit:
//!
//! ```text
//!   255 ┤          ╭──────────
//!  high ┤- - - - -╱- - - - - -   0 -> 1 when filter >= high
//!       │        ╱
//!   low ┤- - - -╱- - - - - - -   1 -> 0 when filter <= low
//!     0 ┼──────╯
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

use crate::signal::{CHANNELS, Snapshot, mask};

/// Fixed-point scale of the filter arithmetic (22 fractional bits).
const SCALE: i64 = 1 << 22;

pub const DEFAULT_TAU: u8 = 50;
pub const DEFAULT_HIGH_THRESHOLD: u8 = 160;
pub const DEFAULT_LOW_THRESHOLD: u8 = 96;
pub const DEFAULT_LED_INVERT_MASK: u16 = 0x000F;

/// One filter step toward 255 (`raw == true`) or 0.
///
/// The step is `scale / (tau + 1)` of the remaining distance, but never less
/// than one whole unit so the output cannot stall short of its target.
/// `tau` below 1 is treated as 1.
pub fn filter_step(prev: u8, raw: bool, tau: u8) -> u8 {
    let target: i64 = if raw { 255 } else { 0 };
    let prev_v = i64::from(prev);
    if prev_v == target {
        return prev;
    }

    let tau = i64::from(tau.max(1));
    let alpha = (SCALE / (tau + 1)).max(1);
    let mut delta = alpha * (target - prev_v);
    if delta / SCALE == 0 {
        delta = if target > prev_v { SCALE } else { -SCALE };
    }

    // Centered on 0 so truncating division rounds toward the midpoint.
    let res = ((prev_v - 128) * SCALE + delta) / SCALE;
    (res.clamp(-128, 127) + 128) as u8
}

/// Input Stage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Debounce time constant per line, in cycles.
    pub tau: [u8; CHANNELS],
    /// Applied to the stable states before they drive the indicator LEDs.
    pub led_invert_mask: u16,
    pub high_threshold: u8,
    pub low_threshold: u8,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            tau: [DEFAULT_TAU; CHANNELS],
            led_invert_mask: DEFAULT_LED_INVERT_MASK,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
            low_threshold: DEFAULT_LOW_THRESHOLD,
        }
    }
}

/// Runtime state of one input line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputChannel {
    pub raw_state: bool,
    pub stable_state: bool,
    pub filter_output: u8,
    pub debounce_ongoing: bool,
    /// Cycles spent in the current (or last) transient.
    pub debounce_duration: u16,
    /// Raw toggles seen during the current (or last) transient.
    pub raw_change_count: u16,
}

impl InputChannel {
    /// Run one cycle for this line.  Returns the new stable state.
    fn update(&mut self, raw: bool, cfg: &InputConfig, tau: u8) -> bool {
        self.filter_output = filter_step(self.filter_output, raw, tau);

        let next = if self.stable_state {
            self.filter_output > cfg.low_threshold
        } else {
            self.filter_output >= cfg.high_threshold
        };

        if raw != self.stable_state && !self.debounce_ongoing {
            self.debounce_ongoing = true;
            self.debounce_duration = 0;
            self.raw_change_count = 0;
        }
        if self.debounce_ongoing {
            self.debounce_duration = self.debounce_duration.saturating_add(1);
            if raw != self.raw_state {
                self.raw_change_count = self.raw_change_count.saturating_add(1);
            }
        }
        if next != self.stable_state {
            self.debounce_ongoing = false;
        }

        self.stable_state = next;
        self.raw_state = raw;
        next
    }
}

/// Debounced input lines plus their published snapshot.
#[derive(Debug, Clone, Default)]
pub struct InputStage {
    config: InputConfig,
    channels: [InputChannel; CHANNELS],
    snapshot: Snapshot,
}

impl InputStage {
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Sample every line once and publish the new snapshot.
    pub fn sample_and_update(&mut self, raw_bits: u16) -> Snapshot {
        let mut states = 0u16;
        for (i, ch) in self.channels.iter_mut().enumerate() {
            let was = ch.stable_state;
            let raw = raw_bits & mask(i) != 0;
            if ch.update(raw, &self.config, self.config.tau[i]) {
                states |= mask(i);
            }
            if ch.stable_state != was {
                debug!(
                    "input {} -> {} after {} cycles, {} raw changes",
                    i, ch.stable_state as u8, ch.debounce_duration, ch.raw_change_count
                );
            }
        }
        self.snapshot = self.snapshot.advance(states);
        self.snapshot
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Stable states with the LED invert mask applied.
    pub fn indicator_bits(&self) -> u16 {
        self.snapshot.states ^ self.config.led_invert_mask
    }

    /// Last sampled raw bits.
    pub fn raw_bits(&self) -> u16 {
        self.channels
            .iter()
            .enumerate()
            .filter(|(_, ch)| ch.raw_state)
            .fold(0, |acc, (i, _)| acc | mask(i))
    }

    pub fn channel(&self, index: usize) -> Option<&InputChannel> {
        self.channels.get(index)
    }

    pub fn channels(&self) -> &[InputChannel; CHANNELS] {
        &self.channels
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut InputConfig {
        &mut self.config
    }
}
