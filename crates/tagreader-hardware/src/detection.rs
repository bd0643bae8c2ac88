//! Tag detection loop.
//!
//! Each detection cycle runs as one critical section on the reader:
//!
//! ```text
//! lock ─► field off ─► infinite listen on/off ─► CRC on ─► parity on
//!      ─► field on ─► select(ISO14443A@106) ─► deselect ─► unlock
//! ```
//!
//! In single-shot mode ([`DetectionLoop::scan`]) one cycle runs and its tag
//! is returned. In callback mode ([`DetectionLoop::scan_with`]) the reader is
//! told to wait for a tag, the callback sees every tag outside the lock, and
//! the loop ends when the callback returns `false`.
//!
//! Whatever way the loop ends (a returned tag, an error, or a panicking
//! callback), one final pass runs under the lock that switches the field
//! off, disables infinite passive listen and deselects.

use crate::reader::{ReaderHandle, TagOf};
use crate::traits::{Connector, Device};
use tagreader_core::{ConfigurationOption, Modulation, Result, flag};
use tracing::{debug, debug_span, trace, warn};

/// Modulation used to detect tags.
pub const DETECT_MODULATION: Modulation = Modulation::ISO14443A_106;

/// Detection loop bound to a [`ReaderHandle`].
pub struct DetectionLoop<'r, C: Connector> {
    reader: &'r ReaderHandle<C>,
}

impl<'r, C: Connector> DetectionLoop<'r, C> {
    pub fn new(reader: &'r ReaderHandle<C>) -> Self {
        Self { reader }
    }

    /// Detect the tag currently on the reader.
    ///
    /// Runs exactly one cycle and returns immediately; fails if no tag is
    /// present.
    ///
    /// # Errors
    ///
    /// Any device failure, after the reader has been cleaned up.
    pub fn scan(&self) -> Result<TagOf<C>> {
        self.run(None)
    }

    /// Wait for tags and hand each one to `on_tag` until it returns `false`.
    ///
    /// Returns the tag `on_tag` declined. Blocks for as long as the reader
    /// waits for a tag; there is no timeout. Failed hardware calls are not
    /// retried, the error ends the loop.
    ///
    /// While `on_tag` runs, the RF field and infinite passive listen are
    /// still on from the cycle that found the tag. The next cycle switches
    /// the field off before re-arming, and the final cleanup switches both
    /// off once the loop ends.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagreader_hardware::mock::MockDevice;
    /// use tagreader_hardware::{ReaderConfig, ReaderHandle};
    ///
    /// # fn main() -> tagreader_core::Result<()> {
    /// let (_device, control) = MockDevice::new();
    /// control.push_tag(vec![1, 1, 1, 1]);
    /// control.push_tag(vec![2, 2, 2, 2]);
    ///
    /// let reader = ReaderHandle::new(ReaderConfig::default(), control.connector());
    /// let mut seen = 0;
    /// let last = reader.detector().scan_with(|_tag| {
    ///     seen += 1;
    ///     seen < 2
    /// })?;
    ///
    /// assert_eq!(last.uid, vec![2, 2, 2, 2]);
    /// assert!(!control.field_active());
    /// # Ok(())
    /// # }
    /// ```
    pub fn scan_with<F>(&self, mut on_tag: F) -> Result<TagOf<C>>
    where
        F: FnMut(&TagOf<C>) -> bool,
    {
        self.run(Some(&mut on_tag))
    }

    fn run(&self, on_tag: Option<&mut dyn FnMut(&TagOf<C>) -> bool>) -> Result<TagOf<C>> {
        let cleanup = FinalCleanup::new(self.reader);
        let outcome = self.cycles(on_tag);
        cleanup.finish(outcome)
    }

    fn cycles(&self, mut on_tag: Option<&mut dyn FnMut(&TagOf<C>) -> bool>) -> Result<TagOf<C>> {
        let listen = on_tag.is_some();
        let mut cycle: u64 = 0;

        loop {
            cycle += 1;
            let tag = self.detect_once(cycle, listen)?;

            let Some(on_tag) = on_tag.as_deref_mut() else {
                return Ok(tag);
            };
            if !on_tag(&tag) {
                debug!("Scan stopped by callback after {} cycle(s)", cycle);
                return Ok(tag);
            }
        }
    }

    /// One locked detect cycle. The lock is released when the guard drops,
    /// including when a step fails.
    fn detect_once(&self, cycle: u64, listen: bool) -> Result<TagOf<C>> {
        let _span = debug_span!("detect_cycle", cycle, listen).entered();
        let mut reader = self.reader.lock();

        reader.run(|device| {
            trace!("Arming field");
            device.configure(ConfigurationOption::ActivateField, flag(false))?;
            device.configure(ConfigurationOption::InfiniteListPassive, flag(listen))?;
            device.configure(ConfigurationOption::HandleCrc, flag(true))?;
            device.configure(ConfigurationOption::HandleParity, flag(true))?;
            device.configure(ConfigurationOption::ActivateField, flag(true))?;

            trace!("Selecting with {}", DETECT_MODULATION);
            let tag = device.select(DETECT_MODULATION)?;
            device.deselect()?;
            debug!("Tag detected");
            Ok(tag)
        })
    }
}

/// Final reader cleanup for one scan, run exactly once.
///
/// [`finish`](Self::finish) runs it on normal exits; `Drop` covers unwinding
/// out of a panicking callback.
struct FinalCleanup<'r, C: Connector> {
    reader: &'r ReaderHandle<C>,
    done: bool,
}

impl<'r, C: Connector> FinalCleanup<'r, C> {
    fn new(reader: &'r ReaderHandle<C>) -> Self {
        Self {
            reader,
            done: false,
        }
    }

    /// Clean up and combine the result with the loop's outcome.
    ///
    /// A loop error takes precedence over a cleanup error.
    fn finish<T>(mut self, outcome: Result<T>) -> Result<T> {
        self.done = true;
        let cleanup = self.reader.release_field();

        match (outcome, cleanup) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup_err)) => {
                warn!("Reader cleanup after failed scan also failed: {}", cleanup_err);
                Err(e)
            }
        }
    }
}

impl<C: Connector> Drop for FinalCleanup<'_, C> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Err(e) = self.reader.release_field() {
            warn!("Reader cleanup during unwind failed: {}", e);
        }
    }
}
