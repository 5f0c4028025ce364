//! Fuzz target: register writes interleaved with cycles
//!
//! Decodes the input as a stream of 5-byte operations (kind, address,
//! value) and applies them to one pipeline.  Whatever the master writes,
//! the map must never panic, a rejected write must leave the configuration
//! untouched, and the resulting configuration must always validate.
//!
//! cargo fuzz run fuzz_register_writes

#![no_main]

use libfuzzer_sys::fuzz_target;
use relaymod::pipeline::Pipeline;
use relaymod::registers::DataModel;

fuzz_target!(|data: &[u8]| {
    let mut p = Pipeline::default();

    for op in data.chunks_exact(5) {
        let addr = u16::from_le_bytes([op[1], op[2]]);
        let value = u16::from_le_bytes([op[3], op[4]]);
        match op[0] % 4 {
            0 => {
                let before = p.config();
                if p.write_holding_register(addr, value).is_err() {
                    assert_eq!(p.config(), before, "rejected write changed config");
                }
            }
            1 => {
                let _ = p.write_coil(addr, value & 1 != 0);
            }
            2 => {
                let _ = p.read_holding_register(addr);
                let _ = p.read_input_register(addr);
                let _ = p.read_coil(addr);
                let _ = p.read_discrete_input(addr);
            }
            _ => {
                let r = p.run_cycle(value);
                assert!(r.input.edges_consistent());
                assert!(r.mixer.edges_consistent());
                assert_eq!(r.physical, r.out_states ^ p.output().config().xor_mask);
            }
        }
    }

    assert!(p.config().validate().is_ok(), "register map produced an invalid config");
});
