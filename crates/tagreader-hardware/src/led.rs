//! Reader LED control.
//!
//! A [`LedIntent`] describes what the LED should do in human terms: the color
//! to settle on, an optional blink color and timing, a repeat count. Before
//! anything is sent, the intent is resolved into a fully populated
//! [`ResolvedLed`] (defaults filled in, durations converted to 10 ms ticks),
//! which [`encode`] packs into a [`RawLedCommand`]. The reader answers every
//! LED command with a status byte that [`decode`] turns back into a [`Color`].
//!
//! # Examples
//!
//! ```
//! use tagreader_core::{Color, RawLedCommand};
//! use tagreader_hardware::led::{LedIntent, encode};
//!
//! # fn main() -> tagreader_core::Result<()> {
//! let intent = LedIntent::new()
//!     .final_color(Color::Red)
//!     .blink_on(0.5)
//!     .blink_off(0.3)
//!     .repeat(4);
//!
//! let resolved = intent.resolve(|| Ok(Color::None))?;
//! assert_eq!(encode(&resolved), RawLedCommand::new(0b0000_1101, 50, 30, 4));
//! # Ok(())
//! # }
//! ```

use crate::reader::ReaderHandle;
use crate::traits::{Connector, Device};
use serde::{Deserialize, Serialize};
use tagreader_core::constants::{
    LED_BLINK_SHIFT, LED_FINAL_COLOR_MARKER, LED_FINAL_COLOR_SHIFT, LED_INIT_BLINK_SHIFT,
    TICKS_PER_SECOND,
};
use tagreader_core::{Color, RawLedCommand, ReaderError, Result};
use tracing::{debug, trace};

/// Lighting intent. Every field is optional; see [`LedIntent::resolve`] for
/// how missing fields are filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedIntent {
    /// Color currently shown. Queried from the reader when unset.
    pub current_color: Option<Color>,
    /// Color to settle on. Defaults to the current color.
    pub final_color: Option<Color>,
    /// Color shown during the first blink phase.
    pub init_blink_color: Option<Color>,
    /// Color shown while blinking.
    pub blink_color: Option<Color>,
    /// Blink on-time in seconds. Defaults to 0.
    pub blink_on_duration: Option<f64>,
    /// Blink off-time in seconds. Defaults to the on-time.
    pub blink_off_duration: Option<f64>,
    /// Number of blinks. Defaults to 1 if the on-time is positive, else 0.
    pub repeat_count: Option<u32>,
}

impl LedIntent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_color(mut self, color: Color) -> Self {
        self.current_color = Some(color);
        self
    }

    pub fn final_color(mut self, color: Color) -> Self {
        self.final_color = Some(color);
        self
    }

    pub fn init_blink_color(mut self, color: Color) -> Self {
        self.init_blink_color = Some(color);
        self
    }

    pub fn blink_color(mut self, color: Color) -> Self {
        self.blink_color = Some(color);
        self
    }

    pub fn blink_on(mut self, seconds: f64) -> Self {
        self.blink_on_duration = Some(seconds);
        self
    }

    pub fn blink_off(mut self, seconds: f64) -> Self {
        self.blink_off_duration = Some(seconds);
        self
    }

    pub fn repeat(mut self, count: u32) -> Self {
        self.repeat_count = Some(count);
        self
    }

    /// Fill in defaults and convert to reader units.
    ///
    /// `current` is called only when no current color is set. Timing is
    /// validated before it is called, so an invalid intent never reaches
    /// the reader.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::InvalidIntent`] for negative or non-finite
    /// durations, durations longer than the reader can count, or more than
    /// 255 repeats. Errors from `current` are passed through.
    pub fn resolve(&self, current: impl FnOnce() -> Result<Color>) -> Result<ResolvedLed> {
        let on_seconds = self.blink_on_duration.unwrap_or(0.0);
        let off_seconds = self.blink_off_duration.unwrap_or(on_seconds);
        let on_ticks = seconds_to_ticks("blink on", on_seconds)?;
        let off_ticks = seconds_to_ticks("blink off", off_seconds)?;

        let repeat = match self.repeat_count {
            Some(count) => u8::try_from(count).map_err(|_| {
                ReaderError::invalid_intent(format!("repeat count {count} exceeds 255"))
            })?,
            None if on_seconds > 0.0 => 1,
            None => 0,
        };

        let current_color = match self.current_color {
            Some(color) => color,
            None => current()?,
        };

        Ok(ResolvedLed {
            current_color,
            final_color: self.final_color.unwrap_or(current_color),
            init_blink_color: self.init_blink_color.unwrap_or_default(),
            blink_color: self.blink_color.unwrap_or_default(),
            on_ticks,
            off_ticks,
            repeat,
        })
    }
}

/// Convert seconds to 10 ms ticks, rounding down.
fn seconds_to_ticks(what: &str, seconds: f64) -> Result<u16> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ReaderError::invalid_intent(format!(
            "{what} duration must be a non-negative number of seconds, got {seconds}"
        )));
    }
    let ticks = (seconds * TICKS_PER_SECOND).floor();
    if ticks > f64::from(u16::MAX) {
        return Err(ReaderError::invalid_intent(format!(
            "{what} duration {seconds}s is longer than the reader supports"
        )));
    }
    Ok(ticks as u16)
}

/// Fully populated lighting intent in reader units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLed {
    pub current_color: Color,
    pub final_color: Color,
    pub init_blink_color: Color,
    pub blink_color: Color,
    pub on_ticks: u16,
    pub off_ticks: u16,
    pub repeat: u8,
}

/// Pack a resolved intent into the reader's raw LED command.
pub fn encode(led: &ResolvedLed) -> RawLedCommand {
    let state = ((LED_FINAL_COLOR_MARKER | led.final_color.request_code()) << LED_FINAL_COLOR_SHIFT)
        | (led.init_blink_color.request_code() << LED_INIT_BLINK_SHIFT)
        | (led.blink_color.request_code() << LED_BLINK_SHIFT);

    RawLedCommand::new(state, led.on_ticks, led.off_ticks, led.repeat)
}

/// Decode a LED status byte.
///
/// # Errors
///
/// Returns [`ReaderError::Protocol`] for bytes outside 0-3.
pub fn decode(status: u8) -> Result<Color> {
    Color::from_status(status)
}

/// LED controller bound to a [`ReaderHandle`].
///
/// Every call holds the reader lock for its whole duration, so LED traffic
/// never interleaves with a detection cycle.
pub struct LedController<'r, C: Connector> {
    reader: &'r ReaderHandle<C>,
}

impl<'r, C: Connector> LedController<'r, C> {
    pub fn new(reader: &'r ReaderHandle<C>) -> Self {
        Self { reader }
    }

    /// Read back the color the LED is showing.
    pub fn query_state(&self) -> Result<Color> {
        self.reader.lock().run(query)
    }

    /// Apply `intent` and return the color the reader reports.
    ///
    /// `None` sends the all-zero command, same as [`query_state`](Self::query_state).
    /// When the intent leaves the current color unset, it is queried from
    /// the reader inside the same critical section.
    pub fn toggle(&self, intent: Option<&LedIntent>) -> Result<Color> {
        self.reader.lock().run(|device| {
            let Some(intent) = intent else {
                return query(device);
            };

            let resolved = intent.resolve(|| query(&mut *device))?;
            let command = encode(&resolved);
            debug!(
                "Setting LED: final={} blink={} init_blink={} ({})",
                resolved.final_color, resolved.blink_color, resolved.init_blink_color, command
            );
            send(device, command)
        })
    }
}

fn query<D: Device>(device: &mut D) -> Result<Color> {
    send(device, RawLedCommand::QUERY)
}

fn send<D: Device>(device: &mut D, command: RawLedCommand) -> Result<Color> {
    trace!("LED command {}", command);
    let status = device.led(
        command.state,
        command.on_ticks,
        command.off_ticks,
        command.repeat,
    )?;
    decode(status)
}
