//! The three-stage signal pipeline and its cycle driver.
//!
//! ```text
//!  raw bits ─▶ InputStage ─▶ Snapshot ─┬─▶ MixerStage ─▶ Snapshot ─┐
//!                                      │                           ▼
//!                                      └──────────────────▶ OutputStage ─▶ out_states
//! ```
//!
//! [`Pipeline::run_cycle`] runs the stages strictly in that order.  Every
//! configuration or overlay access happens between two calls, never inside.

pub mod input;
pub mod mixer;
pub mod output;
pub mod timer;

use log::info;

use crate::config::{BusConfig, ModuleConfig};
use crate::error::ConfigError;
use crate::signal::Snapshot;

use input::InputStage;
use mixer::MixerStage;
use output::OutputStage;

/// What one cycle published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleReport {
    pub input: Snapshot,
    pub mixer: Snapshot,
    pub out_states: u16,
    /// `out_states` after the output inversion mask.
    pub physical: u16,
    /// Indicator LED bits derived from the input states.
    pub indicators: u16,
}

/// Owns every stage plus the module-level settings served over the bus.
#[derive(Debug, Clone)]
pub struct Pipeline {
    input: InputStage,
    mixer: MixerStage,
    output: OutputStage,
    bus: BusConfig,
    cycle_period_ms: u16,
    cycle_count: u32,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ModuleConfig::default())
    }
}

impl Pipeline {
    pub fn new(config: ModuleConfig) -> Self {
        Self {
            input: InputStage::new(config.inputs),
            mixer: MixerStage::new(config.mixer),
            output: OutputStage::new(config.outputs),
            bus: config.bus,
            cycle_period_ms: config.cycle_period_ms,
            cycle_count: 0,
        }
    }

    /// Run one full cycle over `raw_bits`.
    pub fn run_cycle(&mut self, raw_bits: u16) -> CycleReport {
        let input = self.input.sample_and_update(raw_bits);
        let mixer = self.mixer.evaluate(&input);
        let out_states = self.output.update(&input, &mixer);
        self.cycle_count = self.cycle_count.wrapping_add(1);

        CycleReport {
            input,
            mixer,
            out_states,
            physical: self.output.physical_bits(),
            indicators: self.input.indicator_bits(),
        }
    }

    /// Replace the whole configuration.  Nothing changes unless `config`
    /// validates.  Runtime state (filters, timers, snapshots) is kept.
    pub fn apply_config(&mut self, config: ModuleConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.input.config_mut() = config.inputs;
        *self.mixer.config_mut() = config.mixer;
        *self.output.config_mut() = config.outputs;
        self.bus = config.bus;
        self.cycle_period_ms = config.cycle_period_ms;
        info!("configuration applied");
        Ok(())
    }

    /// Current configuration as one aggregate.
    pub fn config(&self) -> ModuleConfig {
        ModuleConfig {
            bus: self.bus,
            inputs: self.input.config().clone(),
            mixer: self.mixer.config().clone(),
            outputs: self.output.config().clone(),
            cycle_period_ms: self.cycle_period_ms,
        }
    }

    pub fn input(&self) -> &InputStage {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputStage {
        &mut self.input
    }

    pub fn mixer(&self) -> &MixerStage {
        &self.mixer
    }

    pub fn mixer_mut(&mut self) -> &mut MixerStage {
        &mut self.mixer
    }

    pub fn output(&self) -> &OutputStage {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut OutputStage {
        &mut self.output
    }

    pub fn bus(&self) -> &BusConfig {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut BusConfig {
        &mut self.bus
    }

    pub fn cycle_period_ms(&self) -> u16 {
        self.cycle_period_ms
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }
}
