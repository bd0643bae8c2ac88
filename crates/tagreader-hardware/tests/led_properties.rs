//! Property-based tests for LED intent resolution and encoding.
//!
//! These use proptest to check that the three state byte fields stay
//! independent and that timing conversion is consistent for any valid input.

use proptest::prelude::*;
use tagreader_core::Color;
use tagreader_hardware::led::{LedIntent, decode, encode};

fn any_color() -> impl Strategy<Value = Color> {
    prop_oneof![
        Just(Color::None),
        Just(Color::Red),
        Just(Color::Green),
        Just(Color::Orange),
    ]
}

/// Blink durations the reader can count (below 655.35 s).
fn valid_seconds() -> impl Strategy<Value = f64> {
    0.0f64..600.0
}

proptest! {
    /// Property: each color lands in its own field and nowhere else.
    #[test]
    fn prop_state_fields_independent(
        final_color in any_color(),
        init_blink in any_color(),
        blink in any_color(),
    ) {
        let led = LedIntent::new()
            .current_color(Color::None)
            .final_color(final_color)
            .init_blink_color(init_blink)
            .blink_color(blink)
            .resolve(|| unreachable!())
            .unwrap();
        let state = encode(&led).state;

        prop_assert_eq!(state & 0b1100, 0b1100);
        prop_assert_eq!(Color::from_request_code(state), final_color);
        prop_assert_eq!(Color::from_request_code(state >> 4), init_blink);
        prop_assert_eq!(Color::from_request_code(state >> 6), blink);
    }

    /// Property: ticks are the floor of seconds * 100 and off-time follows
    /// on-time unless given.
    #[test]
    fn prop_ticks_floor_seconds(on in valid_seconds(), off in proptest::option::of(valid_seconds())) {
        let mut intent = LedIntent::new().current_color(Color::Red).blink_on(on);
        if let Some(off) = off {
            intent = intent.blink_off(off);
        }
        let command = encode(&intent.resolve(|| unreachable!()).unwrap());

        prop_assert_eq!(command.on_ticks, (on * 100.0).floor() as u16);
        prop_assert_eq!(command.off_ticks, (off.unwrap_or(on) * 100.0).floor() as u16);
        prop_assert_eq!(command.repeat, u8::from(on > 0.0));
    }

    /// Property: only status bytes 0-3 decode.
    #[test]
    fn prop_decode_range(status in any::<u8>()) {
        prop_assert_eq!(decode(status).is_ok(), status <= 3);
    }
}
