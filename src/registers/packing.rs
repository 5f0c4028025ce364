//! Packed 16-bit encodings used on the bus.
//!
//! Selector word (only the low byte is meaningful):
//!
//! ```text
//!   7   6   5   4   3   2   1   0
//! ┌───────┬───────┬───────────────┐
//! │source │ group │   bit index   │
//! └───────┴───────┴───────────────┘
//! ```
//!
//! Timer word: bits 0..14 ticks, bit 15 set for `Restart`.

use crate::error::RegisterError;
use crate::pipeline::output::{SignalSelector, SignalSource};
use crate::pipeline::timer::{MAX_TICKS, RestartMode, TimerConfig};
use crate::signal::SignalGroup;

const RESTART_FLAG: u16 = 0x8000;

const fn source_code(source: SignalSource) -> u16 {
    match source {
        SignalSource::Protocol => 0,
        SignalSource::Input => 1,
        SignalSource::Mixer => 2,
        SignalSource::Disabled => 3,
    }
}

const fn group_code(group: SignalGroup) -> u16 {
    match group {
        SignalGroup::State => 0,
        SignalGroup::RiseEdge => 1,
        SignalGroup::FallEdge => 2,
        SignalGroup::AnyEdge => 3,
    }
}

pub const fn encode_selector(sel: &SignalSelector) -> u16 {
    (sel.bit as u16 & 0x0F) | (group_code(sel.group) << 4) | (source_code(sel.source) << 6)
}

pub fn decode_selector(word: u16) -> Result<SignalSelector, RegisterError> {
    if word > 0xFF {
        return Err(RegisterError::IllegalValue);
    }
    let group = match (word >> 4) & 0b11 {
        0 => SignalGroup::State,
        1 => SignalGroup::RiseEdge,
        2 => SignalGroup::FallEdge,
        _ => SignalGroup::AnyEdge,
    };
    let source = match word >> 6 {
        0 => SignalSource::Protocol,
        1 => SignalSource::Input,
        2 => SignalSource::Mixer,
        _ => SignalSource::Disabled,
    };
    Ok(SignalSelector::new(source, group, (word & 0x0F) as u8))
}

pub const fn encode_timer(cfg: &TimerConfig) -> u16 {
    let flag = match cfg.mode {
        RestartMode::Restart => RESTART_FLAG,
        RestartMode::Ignore => 0,
    };
    (cfg.ticks & MAX_TICKS) | flag
}

pub const fn decode_timer(word: u16) -> TimerConfig {
    let mode = if word & RESTART_FLAG != 0 {
        RestartMode::Restart
    } else {
        RestartMode::Ignore
    };
    TimerConfig::new(word & MAX_TICKS, mode)
}
