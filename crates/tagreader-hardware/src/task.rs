//! Async entry points for Tokio applications.
//!
//! Reader calls block the calling thread, `scan_with` possibly for a long
//! time. These wrappers move each call onto Tokio's blocking pool so async
//! tasks are never stalled.
//!
//! Dropping one of the returned futures stops waiting for the result but does
//! not interrupt the call on the reader: it keeps running on the blocking
//! pool, and the detection loop still performs its final cleanup when it
//! ends.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use tagreader_hardware::mock::MockDevice;
//! use tagreader_hardware::{ReaderConfig, ReaderHandle, task};
//!
//! #[tokio::main]
//! async fn main() -> tagreader_core::Result<()> {
//!     let (_device, control) = MockDevice::new();
//!     control.push_tag(vec![0x04, 0xAB, 0xCD, 0xEF]);
//!
//!     let reader = Arc::new(ReaderHandle::new(ReaderConfig::default(), control.connector()));
//!     let tag = task::scan(Arc::clone(&reader)).await?;
//!     assert_eq!(tag.uid_hex(), "04ABCDEF");
//!     Ok(())
//! }
//! ```

use crate::led::LedIntent;
use crate::reader::{ReaderHandle, TagOf};
use crate::traits::Connector;
use std::sync::Arc;
use tagreader_core::{Color, ReaderError, Result};

/// Run [`ReaderHandle::scan`] on the blocking pool.
pub async fn scan<C>(reader: Arc<ReaderHandle<C>>) -> Result<TagOf<C>>
where
    C: Connector + 'static,
    C::Device: 'static,
    TagOf<C>: 'static,
{
    run_blocking(move || reader.scan()).await
}

/// Run [`ReaderHandle::scan_with`] on the blocking pool.
///
/// `on_tag` runs on the blocking thread too.
pub async fn scan_with<C, F>(reader: Arc<ReaderHandle<C>>, on_tag: F) -> Result<TagOf<C>>
where
    C: Connector + 'static,
    C::Device: 'static,
    TagOf<C>: 'static,
    F: FnMut(&TagOf<C>) -> bool + Send + 'static,
{
    run_blocking(move || reader.scan_with(on_tag)).await
}

/// Run [`ReaderHandle::toggle`] on the blocking pool.
pub async fn toggle<C>(reader: Arc<ReaderHandle<C>>, intent: Option<LedIntent>) -> Result<Color>
where
    C: Connector + 'static,
    C::Device: 'static,
{
    run_blocking(move || reader.toggle(intent.as_ref())).await
}

/// Run [`ReaderHandle::query_state`] on the blocking pool.
pub async fn query_state<C>(reader: Arc<ReaderHandle<C>>) -> Result<Color>
where
    C: Connector + 'static,
    C::Device: 'static,
{
    run_blocking(move || reader.query_state()).await
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ReaderError::task(format!("reader task did not complete: {e}")))?
}
