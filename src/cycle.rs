//! Fixed-period cycle pacing.
//!
//! The main loop polls [`CycleClock::poll`] with a monotonic millisecond
//! timestamp.  At most one cycle is granted per poll; if the loop stalled
//! for several periods the clock re-bases instead of bursting, and counts
//! the missed periods as overruns.

use log::warn;

#[derive(Debug, Clone)]
pub struct CycleClock {
    period_ms: u32,
    next_due_ms: u64,
    overruns: u32,
    started: bool,
}

impl CycleClock {
    pub fn new(period_ms: u16) -> Self {
        Self {
            period_ms: u32::from(period_ms.max(1)),
            next_due_ms: 0,
            overruns: 0,
            started: false,
        }
    }

    /// Returns `true` when a cycle should run now.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let period = u64::from(self.period_ms);
        if !self.started {
            self.started = true;
            self.next_due_ms = now_ms + period;
            return true;
        }
        if now_ms < self.next_due_ms {
            return false;
        }

        let late = now_ms - self.next_due_ms;
        if late >= period {
            let missed = (late / period) as u32;
            self.overruns = self.overruns.saturating_add(missed);
            warn!("cycle overrun: {} period(s) missed", missed);
            self.next_due_ms = now_ms + period;
        } else {
            self.next_due_ms += period;
        }
        true
    }

    /// Change the period; takes effect from the next due time.
    pub fn set_period(&mut self, period_ms: u16) {
        self.period_ms = u32::from(period_ms.max(1));
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    /// Milliseconds until the next cycle is due.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.next_due_ms.saturating_sub(now_ms)
    }
}
