//! Output Stage: per-channel delay/hold timer state machine.
//!
//! ```text
//!            activate, TDA > 0            TDA expires
//!  Inactive ──────────────────▶ Pending ──────────────▶ Active
//!     ▲  │                                               │
//!     │  └──────────── activate, TDA == 0 ───────────────┤
//!     │                                                  │
//!     └────────────── THO expires / deactivate ──────────┘
//! ```
//!
//! `deactivate` wins over `activate` in the same cycle.  A timer never ticks
//! on the cycle it was loaded, and the timer of a freshly entered phase
//! first ticks on the following cycle.
//!
//! The protocol overlay is applied to the published word only; it does not
//! change any channel's phase.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::signal::{CHANNELS, SignalGroup, Snapshot, bit, mask};

use super::timer::{Countdown, RestartMode, TimerConfig};

pub const DEFAULT_TDA: TimerConfig = TimerConfig::new(1, RestartMode::Restart);
pub const DEFAULT_THO: TimerConfig = TimerConfig::new(50, RestartMode::Ignore);
pub const DEFAULT_XOR_MASK: u16 = 0x000F;

/// Where a trigger bit comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignalSource {
    /// Only the protocol overlay pulse can trigger.
    Protocol,
    #[default]
    Input,
    Mixer,
    /// Never triggers, not even from the overlay.
    Disabled,
}

/// Trigger selection for one edge of one output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalSelector {
    pub source: SignalSource,
    pub group: SignalGroup,
    /// Line or channel index inside the selected snapshot.
    pub bit: u8,
}

impl SignalSelector {
    pub const fn new(source: SignalSource, group: SignalGroup, bit: u8) -> Self {
        Self { source, group, bit }
    }

    /// Resolve the trigger for this cycle.  `pulse` is the matching overlay bit.
    pub fn resolve(&self, input: &Snapshot, mixer: &Snapshot, pulse: bool) -> bool {
        let from_snapshot = match self.source {
            SignalSource::Input => bit(input.group(self.group), self.bit),
            SignalSource::Mixer => bit(mixer.group(self.group), self.bit),
            SignalSource::Protocol | SignalSource::Disabled => false,
        };
        from_snapshot || (pulse && self.source != SignalSource::Disabled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputChannelConfig {
    pub activate: SignalSelector,
    pub deactivate: SignalSelector,
    /// Delay before an activation request takes effect.
    pub tda: TimerConfig,
    /// Hold time once active.  0 holds until deactivated.
    pub tho: TimerConfig,
}

impl OutputChannelConfig {
    /// Follows input line `line`: on at its rising edge, off at its falling edge.
    pub const fn follow_input(line: u8) -> Self {
        Self {
            activate: SignalSelector::new(SignalSource::Input, SignalGroup::RiseEdge, line),
            deactivate: SignalSelector::new(SignalSource::Input, SignalGroup::FallEdge, line),
            tda: DEFAULT_TDA,
            tho: DEFAULT_THO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub channels: [OutputChannelConfig; CHANNELS],
    /// Inversion applied on the way to the physical relays.
    pub xor_mask: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            channels: core::array::from_fn(|i| OutputChannelConfig::follow_input(i as u8)),
            xor_mask: DEFAULT_XOR_MASK,
        }
    }
}

/// Externally written override fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProtocolOverlay {
    /// One-shot pulses, cleared after each cycle.
    pub activate: u16,
    pub deactivate: u16,
    /// Persistent latches.
    pub keep_active: u16,
    pub keep_inactive: u16,
}

impl ProtocolOverlay {
    /// Fold the latches into an output word.  `keep_inactive` wins.
    pub const fn apply(&self, out: u16) -> u16 {
        (out | self.keep_active) & !self.keep_inactive
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelPhase {
    #[default]
    Inactive,
    PendingActivation,
    Active,
}

/// Runtime state of one output channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputChannel {
    phase: ChannelPhase,
    tda: Countdown,
    tho: Countdown,
}

impl OutputChannel {
    pub const fn phase(&self) -> ChannelPhase {
        self.phase
    }

    pub const fn tda_remaining(&self) -> u16 {
        self.tda.remaining()
    }

    pub const fn tho_remaining(&self) -> u16 {
        self.tho.remaining()
    }

    fn enter_active(&mut self, cfg: &OutputChannelConfig) {
        self.phase = ChannelPhase::Active;
        self.tda.clear();
        self.tho.clear();
        self.tho.arm(cfg.tho);
    }

    /// Run one cycle with resolved triggers.
    pub fn step(&mut self, cfg: &OutputChannelConfig, activate: bool, deactivate: bool) -> ChannelPhase {
        if deactivate {
            self.phase = ChannelPhase::Inactive;
            self.tda.clear();
            self.tho.clear();
            return self.phase;
        }

        let mut tda_loaded = false;
        let mut tho_loaded = false;
        if activate {
            match self.phase {
                ChannelPhase::Inactive | ChannelPhase::PendingActivation => {
                    if cfg.tda.is_enabled() {
                        tda_loaded = self.tda.arm(cfg.tda);
                        if self.tda.is_running() {
                            self.phase = ChannelPhase::PendingActivation;
                        }
                    } else {
                        self.enter_active(cfg);
                        tho_loaded = true;
                    }
                }
                ChannelPhase::Active => {
                    if cfg.tho.is_enabled() {
                        tho_loaded = self.tho.arm(cfg.tho);
                    }
                }
            }
        }

        match self.phase {
            ChannelPhase::PendingActivation if !tda_loaded => {
                if self.tda.tick() {
                    self.enter_active(cfg);
                }
            }
            ChannelPhase::Active if !tho_loaded => {
                if self.tho.tick() {
                    self.phase = ChannelPhase::Inactive;
                }
            }
            _ => {}
        }
        self.phase
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutputStage {
    config: OutputConfig,
    channels: [OutputChannel; CHANNELS],
    overlay: ProtocolOverlay,
    out_states: u16,
}

impl OutputStage {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Run every channel, consume the overlay pulses and publish `out_states`.
    pub fn update(&mut self, input: &Snapshot, mixer: &Snapshot) -> u16 {
        let overlay = self.overlay;
        let mut out = 0u16;

        for (i, (ch, cfg)) in self
            .channels
            .iter_mut()
            .zip(self.config.channels.iter())
            .enumerate()
        {
            let m = mask(i);
            let activate = cfg.activate.resolve(input, mixer, overlay.activate & m != 0);
            let deactivate = cfg
                .deactivate
                .resolve(input, mixer, overlay.deactivate & m != 0);

            let was = ch.phase;
            let now = ch.step(cfg, activate, deactivate);
            if now != was {
                debug!("output {}: {:?} -> {:?}", i, was, now);
            }
            if now == ChannelPhase::Active {
                out |= m;
            }
        }

        self.overlay.activate = 0;
        self.overlay.deactivate = 0;
        self.out_states = overlay.apply(out);
        self.out_states
    }

    pub fn out_states(&self) -> u16 {
        self.out_states
    }

    /// Word driven onto the relays after the static inversion mask.
    pub fn physical_bits(&self) -> u16 {
        self.out_states ^ self.config.xor_mask
    }

    pub fn channel(&self, index: usize) -> Option<&OutputChannel> {
        self.channels.get(index)
    }

    pub fn overlay(&self) -> &ProtocolOverlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut ProtocolOverlay {
        &mut self.overlay
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut OutputConfig {
        &mut self.config
    }
}
