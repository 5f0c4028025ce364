//! Mixer Stage: a clocked Boolean network.
//!
//! Every channel sees 32 candidate bits: 16 derived from the Input Stage
//! snapshot of this cycle and 16 derived from the mixer's own snapshot of
//! the *previous* cycle.
//!
//! ```text
//!   input snapshot ──▶ MaskSet ──▶ bits  0..15 ─┐
//!                                               ├─▶ & usage ─▶ LogicOp ─▶ bit c
//!   prev mixer snap ─▶ MaskSet ──▶ bits 16..31 ─┘
//! ```
//!
//! The new snapshot is built completely before it replaces the previous one,
//! so evaluation order between channels never matters.

use serde::{Deserialize, Serialize};

use crate::signal::{CHANNELS, Snapshot, mask};

/// Selects and conditions bits of one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MaskSet {
    pub invert: u16,
    pub state: u16,
    pub rise: u16,
    pub fall: u16,
}

impl MaskSet {
    pub fn apply(&self, snap: &Snapshot) -> u16 {
        ((snap.states ^ self.invert) & self.state)
            | (snap.edges_rise & self.rise)
            | (snap.edges_fall & self.fall)
    }
}

/// Operator applied to the bits selected by a channel's usage mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum LogicOp {
    /// Constant 0.
    Off = 0,
    #[default]
    And = 1,
    Nand = 2,
    Or = 3,
    Nor = 4,
    Xor = 5,
    Xnor = 6,
    Parity = 7,
}

impl LogicOp {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Off,
            1 => Self::And,
            2 => Self::Nand,
            3 => Self::Or,
            4 => Self::Nor,
            5 => Self::Xor,
            6 => Self::Xnor,
            7 => Self::Parity,
            _ => return None,
        })
    }

    /// Evaluate over `combined` restricted to `usage`.
    pub const fn eval(self, combined: u32, usage: u32) -> bool {
        let sel = combined & usage;
        let odd = sel.count_ones() % 2 == 1;
        match self {
            Self::Off => false,
            Self::And => sel == usage,
            Self::Nand => sel != usage,
            Self::Or => sel != 0,
            Self::Nor => sel == 0,
            Self::Xor | Self::Parity => odd,
            Self::Xnor => !odd,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MixerChannelConfig {
    /// Applied to the Input Stage snapshot (combined bits 0..15).
    pub input: MaskSet,
    /// Applied to the previous mixer snapshot (combined bits 16..31).
    pub mixer: MaskSet,
    pub usage: u32,
    pub op: LogicOp,
}

impl MixerChannelConfig {
    /// Channel that copies the stable state of input `line`.
    pub const fn pass_through(line: usize) -> Self {
        Self {
            input: MaskSet {
                invert: 0,
                state: mask(line),
                rise: 0,
                fall: 0,
            },
            mixer: MaskSet {
                invert: 0,
                state: 0,
                rise: 0,
                fall: 0,
            },
            usage: 1 << line,
            op: LogicOp::And,
        }
    }

    pub fn evaluate(&self, input: &Snapshot, prev_mixer: &Snapshot) -> bool {
        let combined =
            u32::from(self.input.apply(input)) | (u32::from(self.mixer.apply(prev_mixer)) << 16);
        self.op.eval(combined, self.usage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixerConfig {
    pub channels: [MixerChannelConfig; CHANNELS],
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            channels: core::array::from_fn(MixerChannelConfig::pass_through),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MixerStage {
    config: MixerConfig,
    snapshot: Snapshot,
}

impl MixerStage {
    pub fn new(config: MixerConfig) -> Self {
        Self {
            config,
            snapshot: Snapshot::default(),
        }
    }

    /// Evaluate every channel against `input` and last cycle's own snapshot.
    pub fn evaluate(&mut self, input: &Snapshot) -> Snapshot {
        let prev = self.snapshot;
        let states = self
            .config
            .channels
            .iter()
            .enumerate()
            .filter(|(_, ch)| ch.evaluate(input, &prev))
            .fold(0u16, |acc, (i, _)| acc | mask(i));
        self.snapshot = prev.advance(states);
        self.snapshot
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut MixerConfig {
        &mut self.config
    }
}
