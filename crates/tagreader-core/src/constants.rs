//! Reader-level constants.
//!
//! Option codes for `Device::configure`, the modulation used for tag
//! detection, and the bit layout of the LED state byte.
//!
//! # LED State Byte
//!
//! The state byte passed to `Device::led` packs three independent fields,
//! low bits first:
//!
//! | Bits | Field | Encoding |
//! |------|-------|----------|
//! | 0-3 | final color | `0b11` marker in bits 2-3, color code in bits 0-1 |
//! | 4-5 | initial blink color | color code |
//! | 6-7 | blink color | color code |
//!
//! Color codes on the request side are `None=0`, `Red=1`, `Green=2`,
//! `Orange=3`. The status byte the reader answers with uses a different,
//! smaller code space (see [`LED_STATUS_GREEN`] and friends).

// ============================================================================
// Configuration Option Codes
// ============================================================================

/// Let the reader compute and check CRC bytes.
pub const DCO_HANDLE_CRC: u8 = 0x00;

/// Let the reader compute and check parity bits.
pub const DCO_HANDLE_PARITY: u8 = 0x01;

/// Switch the RF field on (1) or off (0).
pub const DCO_ACTIVATE_FIELD: u8 = 0x10;

/// Make `select` block until a tag appears.
pub const DCO_INFINITE_LIST_PASSIVE: u8 = 0x20;

// ============================================================================
// Modulation
// ============================================================================

/// Modulation type code for ISO14443A.
pub const NMT_ISO14443A: u8 = 0x01;

/// Modulation type code for FeliCa.
pub const NMT_FELICA: u8 = 0x04;

/// Baud rate code for 106 kbps.
pub const NBR_106: u8 = 0x01;

/// Baud rate code for 212 kbps.
pub const NBR_212: u8 = 0x02;

/// Baud rate code for 424 kbps.
pub const NBR_424: u8 = 0x03;

// ============================================================================
// LED Timing
// ============================================================================

/// Reader ticks per second.
pub const TICKS_PER_SECOND: f64 = 100.0;

// ============================================================================
// LED State Byte Layout
// ============================================================================

/// Marker bits always set in the final-color nibble.
pub const LED_FINAL_COLOR_MARKER: u8 = 0b1100;

/// Shift of the final-color code.
pub const LED_FINAL_COLOR_SHIFT: u8 = 0;

/// Shift of the initial-blink color code.
pub const LED_INIT_BLINK_SHIFT: u8 = 4;

/// Shift of the blink color code.
pub const LED_BLINK_SHIFT: u8 = 6;

// ============================================================================
// LED Status Byte
// ============================================================================

/// Status byte: LED off.
pub const LED_STATUS_NONE: u8 = 0;

/// Status byte: green lit.
pub const LED_STATUS_GREEN: u8 = 1;

/// Status byte: red lit.
pub const LED_STATUS_RED: u8 = 2;

/// Status byte: red and green lit (orange).
pub const LED_STATUS_ORANGE: u8 = 3;
