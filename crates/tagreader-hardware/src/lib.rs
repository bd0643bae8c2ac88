//! Exclusive reader access, tag detection and LED control.
//!
//! This crate drives a contactless-card reader through the [`Device`]
//! capability. It provides:
//!
//! - [`ReaderHandle`]: one lazily connected reader behind one lock. Every
//!   hardware call in the crate is serialised through it.
//! - [`DetectionLoop`]: arm the RF field, wait for a tag, optionally repeat
//!   under caller control, and always leave the field off.
//! - [`LedController`]: translate a [`LedIntent`] into the reader's raw LED
//!   command and decode the status byte it answers with.
//! - [`task`]: async wrappers that run the blocking calls on Tokio's
//!   blocking pool.
//! - [`mock`]: a scriptable reader for tests and development.
//!
//! # Examples
//!
//! ```
//! use tagreader_core::Color;
//! use tagreader_hardware::led::LedIntent;
//! use tagreader_hardware::mock::MockDevice;
//! use tagreader_hardware::{ReaderConfig, ReaderHandle};
//!
//! # fn main() -> tagreader_core::Result<()> {
//! let (_device, control) = MockDevice::new();
//! control.push_tag(vec![0x04, 0xAB, 0xCD, 0xEF]);
//! control.push_tag(vec![0x04, 0x12, 0x34, 0x56]);
//!
//! let reader = ReaderHandle::new(ReaderConfig::default(), control.connector());
//!
//! // Report tags until the second one arrives.
//! let mut count = 0;
//! let last = reader.scan_with(|tag| {
//!     count += 1;
//!     println!("Tag {}", tag.uid_hex());
//!     count < 2
//! })?;
//! assert_eq!(last.uid_hex(), "04123456");
//!
//! // Then blink green twice and go dark.
//! let blink = LedIntent::new()
//!     .final_color(Color::None)
//!     .blink_color(Color::Green)
//!     .blink_on(0.2)
//!     .repeat(2);
//! reader.toggle(Some(&blink))?;
//! # Ok(())
//! # }
//! ```
//!
//! [`Device`]: traits::Device
//! [`DetectionLoop`]: detection::DetectionLoop
//! [`LedController`]: led::LedController
//! [`LedIntent`]: led::LedIntent

pub mod config;
pub mod detection;
pub mod led;
pub mod mock;
pub mod reader;
pub mod task;
pub mod traits;

pub use config::ReaderConfig;
pub use detection::DetectionLoop;
pub use led::{LedController, LedIntent, ResolvedLed};
pub use reader::{ReaderHandle, TagOf};
pub use traits::{Connector, Device};

pub use tagreader_core::{Color, ReaderError, Result};
