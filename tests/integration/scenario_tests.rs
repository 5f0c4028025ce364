//! End-to-end cycle scenarios, configured only through the register map.

use relaymod::pipeline::Pipeline;
use relaymod::pipeline::output::ChannelPhase;
use relaymod::registers::DataModel;

fn run(p: &mut Pipeline, raw: u16, cycles: u32) {
    for _ in 0..cycles {
        p.run_cycle(raw);
    }
}

// ── Input debounce timing ────────────────────────────────────

#[test]
fn clean_press_is_stable_on_cycle_fifty_one() {
    let mut p = Pipeline::default();
    run(&mut p, 0x0001, 50);
    assert_eq!(p.read_discrete_input(0), Ok(false));
    p.run_cycle(0x0001);
    assert_eq!(p.read_discrete_input(0), Ok(true));
    assert_eq!(p.read_input_register(100), Ok(160));
}

#[test]
fn bounce_delays_the_flip() {
    let mut p = Pipeline::default();
    for raw in [1, 0, 1] {
        p.run_cycle(raw);
    }
    assert_eq!(p.read_input_register(100), Ok(9));

    run(&mut p, 0x0001, 48);
    assert_eq!(p.read_discrete_input(0), Ok(false));
    p.run_cycle(0x0001);
    assert_eq!(p.read_discrete_input(0), Ok(true));
    assert_eq!(p.cycle_count(), 52);
    // Transient closed with its bookkeeping kept.
    assert_eq!(p.read_input_register(120), Ok(52));
    assert_eq!(p.read_input_register(140), Ok(3));
}

#[test]
fn release_from_saturation_needs_fifty_cycles() {
    let mut p = Pipeline::default();
    run(&mut p, 0x0001, 146);
    assert_eq!(p.read_input_register(100), Ok(255));

    run(&mut p, 0, 49);
    assert_eq!(p.read_discrete_input(0), Ok(true));
    let report = p.run_cycle(0);
    assert_eq!(p.read_discrete_input(0), Ok(false));
    assert_eq!(report.input.edges_fall, 0x0001);
}

// ── Output timers ────────────────────────────────────────────

#[test]
fn activation_delay_then_hold_time() {
    let mut p = Pipeline::default();
    // TDA 1 tick restart, THO 50 ticks ignore (defaults, written explicitly).
    assert!(p.write_holding_register(602, 0x8001).is_ok());
    assert!(p.write_holding_register(603, 50).is_ok());

    run(&mut p, 0, 9);
    assert!(p.write_coil(0, true).is_ok());

    p.run_cycle(0);
    assert_eq!(p.cycle_count(), 10);
    assert_eq!(
        p.output().channel(0).map(|c| c.phase()),
        Some(ChannelPhase::PendingActivation)
    );
    assert_eq!(p.read_coil(0), Ok(false));

    p.run_cycle(0);
    assert_eq!(p.read_coil(0), Ok(true));
    assert_eq!(p.output().channel(0).map(|c| c.tho_remaining()), Some(50));

    run(&mut p, 0, 49);
    assert_eq!(p.cycle_count(), 60);
    assert_eq!(p.read_coil(0), Ok(true));

    p.run_cycle(0);
    assert_eq!(p.read_coil(0), Ok(false));
}

#[test]
fn deactivate_beats_activate_in_the_same_cycle() {
    let mut p = Pipeline::default();
    assert!(p.write_holding_register(3, 0x0010).is_ok());
    assert!(p.write_holding_register(2, 0x0010).is_ok());
    run(&mut p, 0, 3);
    assert_eq!(p.read_coil(4), Ok(false));
    assert_eq!(
        p.output().channel(4).map(|c| c.phase()),
        Some(ChannelPhase::Inactive)
    );
}

#[test]
fn keep_inactive_wins_over_keep_active() {
    let mut p = Pipeline::default();
    assert!(p.write_coil(25, true).is_ok());
    assert!(p.write_coil(45, true).is_ok());
    p.run_cycle(0);
    assert_eq!(p.read_input_register(2), Ok(0));

    assert!(p.write_coil(45, false).is_ok());
    p.run_cycle(0);
    assert_eq!(p.read_input_register(2), Ok(0x0020));
    // Relay word carries the inversion mask on lines 0..3.
    assert_eq!(p.read_input_register(4), Ok(0x002F));
}

#[test]
fn overlay_does_not_touch_channel_phase() {
    let mut p = Pipeline::default();
    assert!(p.write_coil(20, true).is_ok());
    run(&mut p, 0, 5);
    assert_eq!(p.read_coil(0), Ok(true));
    assert_eq!(
        p.output().channel(0).map(|c| c.phase()),
        Some(ChannelPhase::Inactive)
    );
}

#[test]
fn protocol_source_ignores_inputs() {
    let mut p = Pipeline::default();
    // Channel 1: activation from protocol pulses only.
    assert!(p.write_holding_register(604, 0x01).is_ok());
    run(&mut p, 0x0002, 60);
    assert_eq!(p.read_discrete_input(1), Ok(true));
    assert_eq!(p.read_coil(1), Ok(false));

    assert!(p.write_holding_register(3, 0x0002).is_ok());
    run(&mut p, 0x0002, 2);
    assert_eq!(p.read_coil(1), Ok(true));
}

#[test]
fn disabled_source_ignores_pulses() {
    let mut p = Pipeline::default();
    assert!(p.write_holding_register(600, 0xC0).is_ok());
    assert!(p.write_coil(0, true).is_ok());
    run(&mut p, 0, 3);
    assert_eq!(p.read_coil(0), Ok(false));
}

// ── Mixer networks ───────────────────────────────────────────

#[test]
fn parity_of_three_lines() {
    let mut p = Pipeline::default();
    for line in 0..3u16 {
        assert!(p.write_holding_register(100 + line, 1).is_ok());
    }
    assert!(p.write_holding_register(201, 0x0007).is_ok());
    assert!(p.write_holding_register(208, 0x0007).is_ok());
    assert!(p.write_holding_register(210, 7).is_ok());

    run(&mut p, 0b011, 10);
    assert_eq!(p.read_input_register(0), Ok(0b011));
    assert_eq!(p.read_input_register(1).map(|w| w & 1), Ok(0));

    run(&mut p, 0b111, 10);
    assert_eq!(p.read_input_register(1).map(|w| w & 1), Ok(1));

    run(&mut p, 0b001, 10);
    assert_eq!(p.read_input_register(1).map(|w| w & 1), Ok(1));
}

#[test]
fn self_holding_mixer_drives_a_latched_output() {
    let mut p = Pipeline::default();
    // Mixer 0 = OR(input 0 rising edge, own previous state).
    assert!(p.write_holding_register(201, 0).is_ok());
    assert!(p.write_holding_register(202, 0x0001).is_ok());
    assert!(p.write_holding_register(205, 0x0001).is_ok());
    assert!(p.write_holding_register(208, 0x0001).is_ok());
    assert!(p.write_holding_register(209, 0x0001).is_ok());
    assert!(p.write_holding_register(210, 3).is_ok());
    // Output 0 = mixer 0 state, no delay, no hold limit, never deactivated.
    assert!(p.write_holding_register(600, 0x80).is_ok());
    assert!(p.write_holding_register(601, 0xC0).is_ok());
    assert!(p.write_holding_register(602, 0).is_ok());
    assert!(p.write_holding_register(603, 0).is_ok());

    run(&mut p, 0x0001, 50);
    assert_eq!(p.read_coil(0), Ok(false));
    p.run_cycle(0x0001);
    assert_eq!(p.read_input_register(1).map(|w| w & 1), Ok(1));
    assert_eq!(p.read_coil(0), Ok(true));

    run(&mut p, 0, 200);
    assert_eq!(p.read_discrete_input(0), Ok(false));
    assert_eq!(p.read_input_register(1).map(|w| w & 1), Ok(1));
    assert_eq!(p.read_coil(0), Ok(true));
}
