//! Register map behaviour as a field-bus master sees it.

use relaymod::error::RegisterError;
use relaymod::pipeline::Pipeline;
use relaymod::registers::{DataModel, holding_register_name};

// ── Address space ────────────────────────────────────────────

#[test]
fn gaps_between_blocks_are_illegal_addresses() {
    let p = Pipeline::default();
    for addr in [4, 49, 56, 99, 119, 199, 211, 219, 520, 599, 665, 0xFFFF] {
        assert_eq!(
            p.read_holding_register(addr),
            Err(RegisterError::IllegalAddress),
            "holding {}",
            addr
        );
    }
    for addr in [5, 99, 116, 156] {
        assert_eq!(p.read_input_register(addr), Err(RegisterError::IllegalAddress));
    }
    assert_eq!(p.read_coil(16), Err(RegisterError::IllegalAddress));
    assert_eq!(p.read_coil(56), Err(RegisterError::IllegalAddress));
    assert_eq!(p.read_discrete_input(16), Err(RegisterError::IllegalAddress));
}

#[test]
fn register_names_resolve() {
    assert_eq!(holding_register_name(0), Some("keep_inactive"));
    assert_eq!(holding_register_name(210), Some("logic_op"));
    assert_eq!(holding_register_name(15 * 20 + 208), Some("usage.low"));
    assert_eq!(holding_register_name(603), Some("tho"));
    assert_eq!(holding_register_name(664), Some("output_xor_mask"));
    assert_eq!(holding_register_name(4), None);
}

// ── Bus settings ─────────────────────────────────────────────

#[test]
fn bus_settings_read_their_table_ids() {
    let p = Pipeline::default();
    assert_eq!(p.read_holding_register(50), Ok(10));
    assert_eq!(p.read_holding_register(52), Ok(4));
    assert_eq!(p.read_holding_register(54), Ok(0));
    assert_eq!(p.read_holding_register(55), Ok(1));
}

#[test]
fn bus_settings_reject_out_of_table_ids() {
    let mut p = Pipeline::default();
    assert_eq!(p.write_holding_register(50, 0), Err(RegisterError::IllegalValue));
    assert_eq!(p.write_holding_register(50, 248), Err(RegisterError::IllegalValue));
    assert_eq!(p.write_holding_register(52, 8), Err(RegisterError::IllegalValue));
    assert_eq!(p.write_holding_register(54, 2), Err(RegisterError::IllegalValue));
    assert_eq!(p.write_holding_register(55, 3), Err(RegisterError::IllegalValue));
    assert_eq!(p.read_holding_register(50), Ok(10));

    assert!(p.write_holding_register(50, 247).is_ok());
    assert!(p.write_holding_register(52, 7).is_ok());
    assert!(p.write_holding_register(55, 2).is_ok());
    assert_eq!(p.bus().baudrate.bits_per_second(), 115_200);
    assert_eq!(p.read_holding_register(55), Ok(2));
}

// ── Input stage settings ─────────────────────────────────────

#[test]
fn zero_tau_still_debounces() {
    let mut p = Pipeline::default();
    assert!(p.write_holding_register(100, 0).is_ok());
    for _ in 0..9 {
        p.run_cycle(0x0001);
    }
    assert_eq!(p.read_input_register(100), Ok(255));
    assert_eq!(p.read_discrete_input(0), Ok(true));
}

// ── Mixer and output channel blocks ──────────────────────────

#[test]
fn mixer_words_address_the_right_channel() {
    let mut p = Pipeline::default();
    let base = 200 + 20 * 3;
    assert!(p.write_holding_register(base + 1, 0x00F0).is_ok());
    assert!(p.write_holding_register(base + 8, 0xBEEF).is_ok());
    assert!(p.write_holding_register(base + 9, 0x0001).is_ok());
    assert!(p.write_holding_register(base + 10, 4).is_ok());

    let ch = &p.mixer().config().channels[3];
    assert_eq!(ch.input.state, 0x00F0);
    assert_eq!(ch.usage, 0x0001_BEEF);
    assert_eq!(ch.op.code(), 4);
    assert_eq!(p.read_holding_register(base + 9), Ok(1));
    // Neighbours untouched.
    assert_eq!(p.mixer().config().channels[2].usage, 1 << 2);
    assert_eq!(p.mixer().config().channels[4].usage, 1 << 4);
}

#[test]
fn logic_op_codes_outside_table_rejected() {
    let mut p = Pipeline::default();
    assert_eq!(p.write_holding_register(210, 8), Err(RegisterError::IllegalValue));
    assert_eq!(p.write_holding_register(210, 0x0101), Err(RegisterError::IllegalValue));
    assert_eq!(p.read_holding_register(210), Ok(1));
}

#[test]
fn selectors_round_trip_and_reject_wide_words() {
    let mut p = Pipeline::default();
    // Mixer stage, rising edge, bit 3.
    assert!(p.write_holding_register(600, 0x93).is_ok());
    assert_eq!(p.read_holding_register(600), Ok(0x93));
    assert_eq!(p.write_holding_register(601, 0x1FF), Err(RegisterError::IllegalValue));
    // Default deactivate selector of channel 0: input stage, falling edge, bit 0.
    assert_eq!(p.read_holding_register(601), Ok(0x60));
}

#[test]
fn timer_words_keep_mode_bit() {
    let mut p = Pipeline::default();
    assert_eq!(p.read_holding_register(602), Ok(0x8001));
    assert_eq!(p.read_holding_register(603), Ok(50));
    assert!(p.write_holding_register(4 * 5 + 603, 0xFFFF).is_ok());
    assert_eq!(p.read_holding_register(4 * 5 + 603), Ok(0xFFFF));
    assert_eq!(p.output().config().channels[5].tho.ticks, 0x7FFF);
}

// ── Overlay ──────────────────────────────────────────────────

#[test]
fn coil_pulse_is_consumed_by_the_next_cycle() {
    let mut p = Pipeline::default();
    assert!(p.write_coil(2, true).is_ok());
    assert_eq!(p.read_holding_register(3), Ok(0x0004));

    p.run_cycle(0);
    assert_eq!(p.read_holding_register(3), Ok(0));
    assert_eq!(p.read_coil(2), Ok(false));

    // TDA of one tick.
    p.run_cycle(0);
    assert_eq!(p.read_coil(2), Ok(true));

    assert!(p.write_coil(2, false).is_ok());
    p.run_cycle(0);
    assert_eq!(p.read_coil(2), Ok(false));
}

#[test]
fn latches_through_coils_and_words_agree() {
    let mut p = Pipeline::default();
    assert!(p.write_coil(27, true).is_ok());
    assert!(p.write_coil(45, true).is_ok());
    assert_eq!(p.read_holding_register(1), Ok(0x0080));
    assert_eq!(p.read_holding_register(0), Ok(0x0020));

    assert!(p.write_holding_register(1, 0x0001).is_ok());
    assert_eq!(p.read_coil(27), Ok(false));
    assert_eq!(p.read_coil(20), Ok(true));
}
