//! Register map: the four Modbus-style data tables over a [`Pipeline`].
//!
//! Every table is a static list of blocks.  A block publishes `count`
//! repetitions of a field list, `stride` addresses apart:
//!
//! ```text
//!   base        base+stride   base+2*stride
//!   │f0 f1 f2 ..│f0 f1 f2 .. │f0 ...
//!   └─ index 0 ─┘└─ index 1 ─┘
//! ```
//!
//! Anything outside a block, or past the end of its field list, answers
//! [`RegisterError::IllegalAddress`].  Writes validate the new value before
//! touching the pipeline, so a rejected write changes nothing.

pub mod packing;

use log::warn;

use crate::config::{Baudrate, BusConfig, Parity, StopBits};
use crate::error::RegisterError;
use crate::pipeline::Pipeline;
use crate::pipeline::mixer::{LogicOp, MixerChannelConfig};
use crate::pipeline::output::OutputChannelConfig;
use crate::signal::{CHANNELS, mask};

use packing::{decode_selector, decode_timer, encode_selector, encode_timer};

type WordGet = fn(&Pipeline, usize) -> u16;
type WordSet = fn(&mut Pipeline, usize, u16) -> Result<(), RegisterError>;
type BitGet = fn(&Pipeline, usize) -> bool;
type BitSet = fn(&mut Pipeline, usize, bool);

/// One word-sized field.  `set == None` makes it read-only.
#[derive(Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    get: WordGet,
    set: Option<WordSet>,
}

impl Field {
    const fn ro(name: &'static str, get: WordGet) -> Self {
        Self {
            name,
            get,
            set: None,
        }
    }

    const fn rw(name: &'static str, get: WordGet, set: WordSet) -> Self {
        Self {
            name,
            get,
            set: Some(set),
        }
    }
}

pub struct Block {
    pub base: u16,
    pub stride: u16,
    pub count: u16,
    pub fields: &'static [Field],
}

pub struct BitField {
    pub name: &'static str,
    get: BitGet,
    set: Option<BitSet>,
}

pub struct BitBlock {
    pub base: u16,
    pub count: u16,
    pub field: BitField,
}

/// Resolve `addr` to a field and the repetition index it belongs to.
fn lookup(blocks: &'static [Block], addr: u16) -> Result<(&'static Field, usize), RegisterError> {
    for block in blocks {
        let Some(offset) = addr.checked_sub(block.base) else {
            continue;
        };
        let index = offset / block.stride;
        let slot = usize::from(offset % block.stride);
        if index < block.count {
            if let Some(field) = block.fields.get(slot) {
                return Ok((field, usize::from(index)));
            }
        }
    }
    Err(RegisterError::IllegalAddress)
}

fn lookup_bit(blocks: &'static [BitBlock], addr: u16) -> Result<(&'static BitField, usize), RegisterError> {
    blocks
        .iter()
        .find_map(|b| {
            let offset = addr.checked_sub(b.base)?;
            (offset < b.count).then_some((&b.field, usize::from(offset)))
        })
        .ok_or(RegisterError::IllegalAddress)
}

// ───────────────────────────────────────────────────────────────
// Field helpers
// ───────────────────────────────────────────────────────────────

fn byte(value: u16) -> Result<u8, RegisterError> {
    u8::try_from(value).map_err(|_| RegisterError::IllegalValue)
}

fn mix(p: &Pipeline, c: usize) -> &MixerChannelConfig {
    &p.mixer().config().channels[c]
}

fn mix_mut(p: &mut Pipeline, c: usize) -> &mut MixerChannelConfig {
    &mut p.mixer_mut().config_mut().channels[c]
}

fn out(p: &Pipeline, c: usize) -> &OutputChannelConfig {
    &p.output().config().channels[c]
}

fn out_mut(p: &mut Pipeline, c: usize) -> &mut OutputChannelConfig {
    &mut p.output_mut().config_mut().channels[c]
}

/// Commit a bus change only if the resulting settings are valid.
fn update_bus(p: &mut Pipeline, f: impl FnOnce(&mut BusConfig)) -> Result<(), RegisterError> {
    let mut candidate = *p.bus();
    f(&mut candidate);
    candidate.validate()?;
    *p.bus_mut() = candidate;
    Ok(())
}

fn set_threshold(p: &mut Pipeline, value: u16, high: bool) -> Result<(), RegisterError> {
    let v = byte(value)?;
    let cfg = p.input_mut().config_mut();
    let (hi, lo) = if high {
        (v, cfg.low_threshold)
    } else {
        (cfg.high_threshold, v)
    };
    if hi <= lo {
        return Err(RegisterError::IllegalValue);
    }
    cfg.high_threshold = hi;
    cfg.low_threshold = lo;
    Ok(())
}

/// One mixer channel block: the eight mask words, input masks first, then
/// the usage mask halves and the logic operator.
macro_rules! mixer_fields {
    ($($set:ident . $word:ident),* $(,)?) => {
        [
            $(
                Field::rw(
                    concat!(stringify!($set), ".", stringify!($word)),
                    |p, c| mix(p, c).$set.$word,
                    |p, c, v| {
                        mix_mut(p, c).$set.$word = v;
                        Ok(())
                    },
                ),
            )*
            Field::rw(
                "usage.low",
                |p, c| mix(p, c).usage as u16,
                |p, c, v| {
                    let ch = mix_mut(p, c);
                    ch.usage = (ch.usage & 0xFFFF_0000) | u32::from(v);
                    Ok(())
                },
            ),
            Field::rw(
                "usage.high",
                |p, c| (mix(p, c).usage >> 16) as u16,
                |p, c, v| {
                    let ch = mix_mut(p, c);
                    ch.usage = (ch.usage & 0x0000_FFFF) | (u32::from(v) << 16);
                    Ok(())
                },
            ),
            Field::rw(
                "logic_op",
                |p, c| u16::from(mix(p, c).op.code()),
                |p, c, v| {
                    mix_mut(p, c).op = LogicOp::from_code(byte(v)?).ok_or(RegisterError::IllegalValue)?;
                    Ok(())
                },
            ),
        ]
    };
}

static MIXER_FIELDS: [Field; 11] = mixer_fields!(
    input.invert,
    input.state,
    input.rise,
    input.fall,
    mixer.invert,
    mixer.state,
    mixer.rise,
    mixer.fall,
);

// ───────────────────────────────────────────────────────────────
// Tables
// ───────────────────────────────────────────────────────────────

pub static COILS: [BitBlock; 3] = [
    BitBlock {
        base: 0,
        count: CHANNELS as u16,
        field: BitField {
            name: "out_states",
            get: |p, i| p.output().out_states() & mask(i) != 0,
            set: Some(|p: &mut Pipeline, i: usize, on: bool| {
                let ov = p.output_mut().overlay_mut();
                if on {
                    ov.activate |= mask(i);
                } else {
                    ov.deactivate |= mask(i);
                }
            }),
        },
    },
    BitBlock {
        base: 20,
        count: CHANNELS as u16,
        field: BitField {
            name: "keep_active",
            get: |p, i| p.output().overlay().keep_active & mask(i) != 0,
            set: Some(|p: &mut Pipeline, i: usize, on: bool| {
                let ov = p.output_mut().overlay_mut();
                ov.keep_active = if on { ov.keep_active | mask(i) } else { ov.keep_active & !mask(i) };
            }),
        },
    },
    BitBlock {
        base: 40,
        count: CHANNELS as u16,
        field: BitField {
            name: "keep_inactive",
            get: |p, i| p.output().overlay().keep_inactive & mask(i) != 0,
            set: Some(|p: &mut Pipeline, i: usize, on: bool| {
                let ov = p.output_mut().overlay_mut();
                ov.keep_inactive = if on { ov.keep_inactive | mask(i) } else { ov.keep_inactive & !mask(i) };
            }),
        },
    },
];

pub static DISCRETE_INPUTS: [BitBlock; 1] = [BitBlock {
    base: 0,
    count: CHANNELS as u16,
    field: BitField {
        name: "input_states",
        get: |p, i| p.input().snapshot().states & mask(i) != 0,
        set: None,
    },
}];

pub static INPUT_REGISTERS: [Block; 4] = [
    Block {
        base: 0,
        stride: 5,
        count: 1,
        fields: &[
            Field::ro("input_states", |p, _| p.input().snapshot().states),
            Field::ro("mixer_states", |p, _| p.mixer().snapshot().states),
            Field::ro("out_states", |p, _| p.output().out_states()),
            Field::ro("raw_bits", |p, _| p.input().raw_bits()),
            Field::ro("physical_outputs", |p, _| p.output().physical_bits()),
        ],
    },
    Block {
        base: 100,
        stride: 1,
        count: CHANNELS as u16,
        fields: &[Field::ro("filter_output", |p, i| {
            u16::from(p.input().channels()[i].filter_output)
        })],
    },
    Block {
        base: 120,
        stride: 1,
        count: CHANNELS as u16,
        fields: &[Field::ro("debounce_duration", |p, i| {
            p.input().channels()[i].debounce_duration
        })],
    },
    Block {
        base: 140,
        stride: 1,
        count: CHANNELS as u16,
        fields: &[Field::ro("raw_change_count", |p, i| {
            p.input().channels()[i].raw_change_count
        })],
    },
];

pub static HOLDING_REGISTERS: [Block; 7] = [
    Block {
        base: 0,
        stride: 4,
        count: 1,
        fields: &[
            Field::rw(
                "keep_inactive",
                |p, _| p.output().overlay().keep_inactive,
                |p, _, v| {
                    p.output_mut().overlay_mut().keep_inactive = v;
                    Ok(())
                },
            ),
            Field::rw(
                "keep_active",
                |p, _| p.output().overlay().keep_active,
                |p, _, v| {
                    p.output_mut().overlay_mut().keep_active = v;
                    Ok(())
                },
            ),
            Field::rw(
                "deactivate",
                |p, _| p.output().overlay().deactivate,
                |p, _, v| {
                    p.output_mut().overlay_mut().deactivate = v;
                    Ok(())
                },
            ),
            Field::rw(
                "activate",
                |p, _| p.output().overlay().activate,
                |p, _, v| {
                    p.output_mut().overlay_mut().activate = v;
                    Ok(())
                },
            ),
        ],
    },
    Block {
        base: 50,
        stride: 6,
        count: 1,
        fields: &[
            Field::rw(
                "bus.slave_id",
                |p, _| u16::from(p.bus().slave_id),
                |p, _, v| {
                    let id = byte(v)?;
                    update_bus(p, |b| b.slave_id = id)
                },
            ),
            Field::ro("bus.port_id", |p, _| u16::from(p.bus().port_id)),
            Field::rw(
                "bus.baudrate",
                |p, _| p.bus().baudrate as u16,
                |p, _, v| {
                    let baud = Baudrate::from_id(byte(v)?).ok_or(RegisterError::IllegalValue)?;
                    update_bus(p, |b| b.baudrate = baud)
                },
            ),
            Field::ro("bus.data_bits", |p, _| p.bus().data_bits as u16),
            Field::rw(
                "bus.stop_bits",
                |p, _| p.bus().stop_bits as u16,
                |p, _, v| {
                    let stop = StopBits::from_id(byte(v)?).ok_or(RegisterError::IllegalValue)?;
                    update_bus(p, |b| b.stop_bits = stop)
                },
            ),
            Field::rw(
                "bus.parity",
                |p, _| p.bus().parity as u16,
                |p, _, v| {
                    let parity = Parity::from_id(byte(v)?).ok_or(RegisterError::IllegalValue)?;
                    update_bus(p, |b| b.parity = parity)
                },
            ),
        ],
    },
    Block {
        base: 100,
        stride: 1,
        count: CHANNELS as u16,
        fields: &[Field::rw(
            "tau",
            |p, i| u16::from(p.input().config().tau[i]),
            |p, i, v| {
                p.input_mut().config_mut().tau[i] = byte(v)?;
                Ok(())
            },
        )],
    },
    Block {
        base: 116,
        stride: 3,
        count: 1,
        fields: &[
            Field::rw(
                "led_invert_mask",
                |p, _| p.input().config().led_invert_mask,
                |p, _, v| {
                    p.input_mut().config_mut().led_invert_mask = v;
                    Ok(())
                },
            ),
            Field::rw(
                "high_threshold",
                |p, _| u16::from(p.input().config().high_threshold),
                |p, _, v| set_threshold(p, v, true),
            ),
            Field::rw(
                "low_threshold",
                |p, _| u16::from(p.input().config().low_threshold),
                |p, _, v| set_threshold(p, v, false),
            ),
        ],
    },
    Block {
        base: 200,
        stride: 20,
        count: CHANNELS as u16,
        fields: &MIXER_FIELDS,
    },
    Block {
        base: 600,
        stride: 4,
        count: CHANNELS as u16,
        fields: &[
            Field::rw(
                "activate_selector",
                |p, c| encode_selector(&out(p, c).activate),
                |p, c, v| {
                    out_mut(p, c).activate = decode_selector(v)?;
                    Ok(())
                },
            ),
            Field::rw(
                "deactivate_selector",
                |p, c| encode_selector(&out(p, c).deactivate),
                |p, c, v| {
                    out_mut(p, c).deactivate = decode_selector(v)?;
                    Ok(())
                },
            ),
            Field::rw(
                "tda",
                |p, c| encode_timer(&out(p, c).tda),
                |p, c, v| {
                    out_mut(p, c).tda = decode_timer(v);
                    Ok(())
                },
            ),
            Field::rw(
                "tho",
                |p, c| encode_timer(&out(p, c).tho),
                |p, c, v| {
                    out_mut(p, c).tho = decode_timer(v);
                    Ok(())
                },
            ),
        ],
    },
    Block {
        base: 664,
        stride: 1,
        count: 1,
        fields: &[Field::rw(
            "output_xor_mask",
            |p, _| p.output().config().xor_mask,
            |p, _, v| {
                p.output_mut().config_mut().xor_mask = v;
                Ok(())
            },
        )],
    },
];

// ───────────────────────────────────────────────────────────────
// Data model
// ───────────────────────────────────────────────────────────────

/// The four data tables as seen by a field-bus server.
pub trait DataModel {
    fn read_coil(&self, addr: u16) -> Result<bool, RegisterError>;
    fn write_coil(&mut self, addr: u16, value: bool) -> Result<(), RegisterError>;
    fn read_discrete_input(&self, addr: u16) -> Result<bool, RegisterError>;
    fn read_input_register(&self, addr: u16) -> Result<u16, RegisterError>;
    fn read_holding_register(&self, addr: u16) -> Result<u16, RegisterError>;
    fn write_holding_register(&mut self, addr: u16, value: u16) -> Result<(), RegisterError>;
}

impl DataModel for Pipeline {
    fn read_coil(&self, addr: u16) -> Result<bool, RegisterError> {
        let (field, i) = lookup_bit(&COILS, addr)?;
        Ok((field.get)(self, i))
    }

    fn write_coil(&mut self, addr: u16, value: bool) -> Result<(), RegisterError> {
        let (field, i) = lookup_bit(&COILS, addr)?;
        let set = field.set.ok_or(RegisterError::ReadOnly)?;
        set(self, i, value);
        Ok(())
    }

    fn read_discrete_input(&self, addr: u16) -> Result<bool, RegisterError> {
        let (field, i) = lookup_bit(&DISCRETE_INPUTS, addr)?;
        Ok((field.get)(self, i))
    }

    fn read_input_register(&self, addr: u16) -> Result<u16, RegisterError> {
        let (field, i) = lookup(&INPUT_REGISTERS, addr)?;
        Ok((field.get)(self, i))
    }

    fn read_holding_register(&self, addr: u16) -> Result<u16, RegisterError> {
        let (field, i) = lookup(&HOLDING_REGISTERS, addr)?;
        Ok((field.get)(self, i))
    }

    fn write_holding_register(&mut self, addr: u16, value: u16) -> Result<(), RegisterError> {
        let (field, i) = lookup(&HOLDING_REGISTERS, addr)?;
        let set = field.set.ok_or(RegisterError::ReadOnly)?;
        set(self, i, value).inspect_err(|e| {
            warn!("holding {} ({}[{}]) = {:#06x} rejected: {}", addr, field.name, i, value, e);
        })
    }
}

/// Name of the holding register at `addr`, for logs and tooling.
pub fn holding_register_name(addr: u16) -> Option<&'static str> {
    lookup(&HOLDING_REGISTERS, addr).ok().map(|(f, _)| f.name)
}
