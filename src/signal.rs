//! Signal snapshots shared between pipeline stages.
//!
//! Every stage publishes one [`Snapshot`] per cycle: the stable state word
//! plus the three edge words derived from the previous state word.  Stages
//! only ever read each other's snapshots by reference.
//!
//! ```text
//!   prev states ──┐
//!                 ├──▶ rise = !prev &  cur
//!   cur states  ──┤    fall =  prev & !cur
//!                 └──▶ any  =  prev ^  cur
//! ```

use serde::{Deserialize, Serialize};

/// Number of lines/channels per stage.  Fixed at build time; every stage
/// array is sized by this constant.
pub const CHANNELS: usize = 16;

/// One cycle's output of a stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub states: u16,
    pub edges_rise: u16,
    pub edges_fall: u16,
    pub edges_any: u16,
}

impl Snapshot {
    /// Build the next snapshot from `self` (the previous cycle) and the new
    /// state word.  Edges are a pure function of the two state words.
    pub const fn advance(&self, states: u16) -> Self {
        let prev = self.states;
        Self {
            states,
            edges_rise: !prev & states,
            edges_fall: prev & !states,
            edges_any: prev ^ states,
        }
    }

    /// Word selected by `group`.
    pub const fn group(&self, group: SignalGroup) -> u16 {
        match group {
            SignalGroup::State => self.states,
            SignalGroup::RiseEdge => self.edges_rise,
            SignalGroup::FallEdge => self.edges_fall,
            SignalGroup::AnyEdge => self.edges_any,
        }
    }

    /// True if the edge words are consistent with each other.
    pub const fn edges_consistent(&self) -> bool {
        self.edges_rise & self.edges_fall == 0
            && self.edges_any == self.edges_rise | self.edges_fall
    }
}

/// Which word of a snapshot a selector reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignalGroup {
    #[default]
    State,
    RiseEdge,
    FallEdge,
    AnyEdge,
}

/// Test bit `index` of `word`.  Indices outside the word read as 0.
pub const fn bit(word: u16, index: u8) -> bool {
    (index as usize) < CHANNELS && word & (1 << index) != 0
}

/// Single-bit mask for channel `index`.
pub const fn mask(index: usize) -> u16 {
    1 << index
}
