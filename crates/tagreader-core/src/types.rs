use crate::constants::*;
use crate::error::{ReaderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// LED color as understood by the reader.
///
/// The reader has a red and a green LED; orange is both lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[default]
    None,
    Red,
    Green,
    Orange,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::None, Color::Red, Color::Green, Color::Orange];

    /// Two-bit code used by the request side of the LED command.
    pub fn request_code(self) -> u8 {
        match self {
            Color::None => 0b00,
            Color::Red => 0b01,
            Color::Green => 0b10,
            Color::Orange => 0b11,
        }
    }

    /// Decode a status byte returned by the reader.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Protocol`] for any byte outside 0-3; those
    /// values have no defined meaning.
    pub fn from_status(status: u8) -> Result<Self> {
        match status {
            LED_STATUS_NONE => Ok(Color::None),
            LED_STATUS_GREEN => Ok(Color::Green),
            LED_STATUS_RED => Ok(Color::Red),
            LED_STATUS_ORANGE => Ok(Color::Orange),
            other => Err(ReaderError::protocol(other)),
        }
    }

    /// Decode a two-bit request code. Only the low two bits are used.
    pub fn from_request_code(code: u8) -> Self {
        match code & 0b11 {
            0b00 => Color::None,
            0b01 => Color::Red,
            0b10 => Color::Green,
            _ => Color::Orange,
        }
    }

    /// Status byte the reader reports while this color is lit.
    pub fn status_code(self) -> u8 {
        match self {
            Color::None => LED_STATUS_NONE,
            Color::Green => LED_STATUS_GREEN,
            Color::Red => LED_STATUS_RED,
            Color::Orange => LED_STATUS_ORANGE,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::None => "none",
            Color::Red => "red",
            Color::Green => "green",
            Color::Orange => "orange",
        };
        f.write_str(name)
    }
}

impl FromStr for Color {
    type Err = ReaderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" => Ok(Color::None),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "orange" => Ok(Color::Orange),
            _ => Err(ReaderError::invalid_intent(format!(
                "Unknown color: {s} (use none, red, green or orange)"
            ))),
        }
    }
}

/// Reader configuration options accepted by `Device::configure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConfigurationOption {
    HandleCrc,
    HandleParity,
    ActivateField,
    InfiniteListPassive,
}

impl ConfigurationOption {
    /// Option code understood by the reader driver.
    pub fn code(self) -> u8 {
        match self {
            Self::HandleCrc => DCO_HANDLE_CRC,
            Self::HandleParity => DCO_HANDLE_PARITY,
            Self::ActivateField => DCO_ACTIVATE_FIELD,
            Self::InfiniteListPassive => DCO_INFINITE_LIST_PASSIVE,
        }
    }
}

impl fmt::Display for ConfigurationOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::HandleCrc => "HandleCrc",
            Self::HandleParity => "HandleParity",
            Self::ActivateField => "ActivateField",
            Self::InfiniteListPassive => "InfiniteListPassive",
        };
        f.write_str(name)
    }
}

/// Encode a boolean option value the way the reader expects it.
pub fn flag(enabled: bool) -> i32 {
    i32::from(enabled)
}

/// Tag technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ModulationType {
    Iso14443A,
    Felica,
}

impl ModulationType {
    pub fn code(self) -> u8 {
        match self {
            Self::Iso14443A => NMT_ISO14443A,
            Self::Felica => NMT_FELICA,
        }
    }
}

/// Air-interface bit rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BaudRate {
    Kbps106,
    Kbps212,
    Kbps424,
}

impl BaudRate {
    pub fn code(self) -> u8 {
        match self {
            Self::Kbps106 => NBR_106,
            Self::Kbps212 => NBR_212,
            Self::Kbps424 => NBR_424,
        }
    }

    pub fn kbps(self) -> u32 {
        match self {
            Self::Kbps106 => 106,
            Self::Kbps212 => 212,
            Self::Kbps424 => 424,
        }
    }
}

/// Modulation used when selecting a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modulation {
    pub kind: ModulationType,
    pub baud: BaudRate,
}

impl Modulation {
    /// ISO14443A at 106 kbps, the modulation used for tag detection.
    pub const ISO14443A_106: Modulation = Modulation {
        kind: ModulationType::Iso14443A,
        baud: BaudRate::Kbps106,
    };

    pub const fn new(kind: ModulationType, baud: BaudRate) -> Self {
        Self { kind, baud }
    }
}

impl fmt::Display for Modulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ModulationType::Iso14443A => "ISO14443A",
            ModulationType::Felica => "FeliCa",
        };
        write!(f, "{kind}@{}kbps", self.baud.kbps())
    }
}

/// Wire-level LED command accepted by `Device::led`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RawLedCommand {
    /// Packed color fields, see [`crate::constants`].
    pub state: u8,
    /// Blink on-time in 10 ms ticks.
    pub on_ticks: u16,
    /// Blink off-time in 10 ms ticks.
    pub off_ticks: u16,
    /// Number of blink repetitions.
    pub repeat: u8,
}

impl RawLedCommand {
    /// The all-zero command, used to read back the LED status.
    pub const QUERY: RawLedCommand = RawLedCommand {
        state: 0,
        on_ticks: 0,
        off_ticks: 0,
        repeat: 0,
    };

    pub const fn new(state: u8, on_ticks: u16, off_ticks: u16, repeat: u8) -> Self {
        Self {
            state,
            on_ticks,
            off_ticks,
            repeat,
        }
    }

    pub fn is_query(&self) -> bool {
        *self == Self::QUERY
    }
}

impl fmt::Display for RawLedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state=0b{:08b} on={} off={} repeat={}",
            self.state, self.on_ticks, self.off_ticks, self.repeat
        )
    }
}
