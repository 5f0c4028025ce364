//! GPIO assignments for the relay/input module board.
//!
//! Single source of truth: `main` builds every pin bank from these tables.
//! Index *n* of each table is line *n* of the corresponding bank, so the
//! order here is the bit order of the state words.

use crate::signal::CHANNELS;

// ---------------------------------------------------------------------------
// Digital inputs (opto-coupled, 24 V field side)
// ---------------------------------------------------------------------------

/// Input lines 0..7.  The opto-couplers pull the GPIO low when the field
/// contact closes.
pub const INPUT_GPIOS: [i32; 8] = [4, 5, 6, 7, 15, 16, 17, 18];

/// Every input line on this board reads low when asserted.
pub const INPUT_ACTIVE_LOW_MASK: u16 = 0x00FF;

// ---------------------------------------------------------------------------
// Relay drivers (ULN2803, active HIGH)
// ---------------------------------------------------------------------------

/// Relay coils 0..7.
pub const RELAY_GPIOS: [i32; 8] = [8, 9, 10, 11, 12, 13, 14, 21];

// ---------------------------------------------------------------------------
// Indicator LEDs (one per input line, active HIGH)
// ---------------------------------------------------------------------------

pub const LED_GPIOS: [i32; 4] = [38, 39, 40, 41];

// ---------------------------------------------------------------------------
// RS-485 transceiver (field bus)
// ---------------------------------------------------------------------------

pub const RS485_TX_GPIO: i32 = 43;
pub const RS485_RX_GPIO: i32 = 44;
/// Driver-enable line of the transceiver, HIGH while transmitting.
pub const RS485_DE_GPIO: i32 = 42;

const _: () = assert!(INPUT_GPIOS.len() <= CHANNELS);
const _: () = assert!(RELAY_GPIOS.len() <= CHANNELS);
const _: () = assert!(LED_GPIOS.len() <= CHANNELS);
