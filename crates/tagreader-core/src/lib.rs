//! Shared vocabulary for the tagreader workspace.
//!
//! Holds the error taxonomy, the reader's option codes and LED bit layout,
//! and the small value types that cross the `Device` boundary in
//! `tagreader-hardware`.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{ReaderError, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
