//! Module configuration parameters
//!
//! Everything the field bus can change at runtime, gathered into one
//! aggregate.  Factory defaults make the module a 16-way "input follows
//! relay" device with a short hold time.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pipeline::input::InputConfig;
use crate::pipeline::mixer::MixerConfig;
use crate::pipeline::output::{OutputConfig, SignalSource};
use crate::pipeline::timer::MAX_TICKS;
use crate::signal::CHANNELS;

pub const DEFAULT_CYCLE_PERIOD_MS: u16 = 10;

// ---------------------------------------------------------------------------
// Serial bus settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Baudrate {
    B1200 = 0,
    B2400 = 1,
    B4800 = 2,
    B9600 = 3,
    #[default]
    B19200 = 4,
    B38400 = 5,
    B57600 = 6,
    B115200 = 7,
}

impl Baudrate {
    pub const fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0 => Self::B1200,
            1 => Self::B2400,
            2 => Self::B4800,
            3 => Self::B9600,
            4 => Self::B19200,
            5 => Self::B38400,
            6 => Self::B57600,
            7 => Self::B115200,
            _ => return None,
        })
    }

    pub const fn bits_per_second(self) -> u32 {
        match self {
            Self::B1200 => 1200,
            Self::B2400 => 2400,
            Self::B4800 => 4800,
            Self::B9600 => 9600,
            Self::B19200 => 19_200,
            Self::B38400 => 38_400,
            Self::B57600 => 57_600,
            Self::B115200 => 115_200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum DataBits {
    Seven = 0,
    #[default]
    Eight = 1,
}

impl DataBits {
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Seven),
            1 => Some(Self::Eight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum StopBits {
    #[default]
    One = 0,
    Two = 1,
}

impl StopBits {
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::One),
            1 => Some(Self::Two),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Parity {
    Odd = 0,
    #[default]
    Even = 1,
    None = 2,
}

impl Parity {
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Odd),
            1 => Some(Self::Even),
            2 => Some(Self::None),
            _ => None,
        }
    }
}

/// Field-bus slave settings.  Held as configuration data only; the
/// transport picks them up when it (re)opens the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusConfig {
    pub slave_id: u8,
    /// Physical UART.  Fixed by the board.
    pub port_id: u8,
    pub baudrate: Baudrate,
    /// Fixed by the board.
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            slave_id: 10,
            port_id: 0,
            baudrate: Baudrate::B19200,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::Even,
        }
    }
}

impl BusConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=247).contains(&self.slave_id) {
            return Err(ConfigError::ValidationFailed("bus.slave_id outside 1..=247"));
        }
        if self.data_bits == DataBits::Seven && self.parity == Parity::None {
            return Err(ConfigError::ValidationFailed(
                "bus: 7 data bits require parity",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Complete runtime configuration of the module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub bus: BusConfig,
    pub inputs: InputConfig,
    pub mixer: MixerConfig,
    pub outputs: OutputConfig,
    pub cycle_period_ms: u16,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            bus: BusConfig::default(),
            inputs: InputConfig::default(),
            mixer: MixerConfig::default(),
            outputs: OutputConfig::default(),
            cycle_period_ms: DEFAULT_CYCLE_PERIOD_MS,
        }
    }
}

impl ModuleConfig {
    /// Reject anything the pipeline could not run as-is.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bus.validate()?;

        if self.cycle_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("cycle_period_ms must be > 0"));
        }
        if self.inputs.high_threshold <= self.inputs.low_threshold {
            return Err(ConfigError::ValidationFailed(
                "inputs: high threshold must exceed low threshold",
            ));
        }

        for ch in &self.outputs.channels {
            for sel in [ch.activate, ch.deactivate] {
                if usize::from(sel.bit) >= CHANNELS && sel.source != SignalSource::Disabled {
                    return Err(ConfigError::ValidationFailed("outputs: selector bit out of range"));
                }
            }
            if ch.tda.ticks > MAX_TICKS || ch.tho.ticks > MAX_TICKS {
                return Err(ConfigError::ValidationFailed("outputs: timer ticks exceed 15 bits"));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|_| ConfigError::Corrupted)
    }

    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(s).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(|_| ConfigError::Corrupted)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let cfg: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }
}
