//! Exclusive, lazily connected access to one reader.
//!
//! A [`ReaderHandle`] owns the reader connection behind a single mutex.
//! Every hardware operation in the crate goes through [`ReaderHandle::lock`],
//! so no two device calls ever overlap, whichever thread issues them.
//!
//! The handle is constructed explicitly and shared by reference or `Arc`;
//! there is no process-wide instance.
//!
//! # Examples
//!
//! ```
//! use tagreader_hardware::mock::MockDevice;
//! use tagreader_hardware::{ReaderConfig, ReaderHandle};
//!
//! # fn main() -> tagreader_core::Result<()> {
//! let (_device, control) = MockDevice::new();
//! control.push_tag(vec![0x04, 0xAB, 0xCD, 0xEF]);
//!
//! let reader = ReaderHandle::new(ReaderConfig::default(), control.connector());
//! assert!(!reader.is_connected());
//!
//! let tag = reader.scan()?;
//! assert_eq!(tag.uid_hex(), "04ABCDEF");
//! assert!(reader.is_connected());
//! # Ok(())
//! # }
//! ```

use crate::config::ReaderConfig;
use crate::detection::DetectionLoop;
use crate::led::{LedController, LedIntent};
use crate::traits::{Connector, Device};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tagreader_core::{Color, ConfigurationOption, ReaderError, Result, flag};
use tracing::{debug, info, warn};

/// Tag type produced by the devices of connector `C`.
pub type TagOf<C> = <<C as Connector>::Device as Device>::Tag;

/// Shared handle to a single reader.
pub struct ReaderHandle<C: Connector> {
    config: ReaderConfig,
    connector: C,
    device: Mutex<Option<C::Device>>,
}

impl<C: Connector> ReaderHandle<C> {
    /// Create a handle. No connection is made until the first reader call.
    pub fn new(config: ReaderConfig, connector: C) -> Self {
        debug!("Creating reader handle (connstring: {:?})", config.connstring);
        Self {
            config,
            connector,
            device: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Whether a reader connection is currently held.
    ///
    /// Waits for the reader lock.
    pub fn is_connected(&self) -> bool {
        self.lock().slot.is_some()
    }

    /// Drop the current connection; the next reader call reconnects.
    pub fn disconnect(&self) {
        if self.lock().slot.take().is_some() {
            info!("Reader connection dropped");
        }
    }

    /// Detection loop bound to this reader.
    pub fn detector(&self) -> DetectionLoop<'_, C> {
        DetectionLoop::new(self)
    }

    /// LED controller bound to this reader.
    pub fn led(&self) -> LedController<'_, C> {
        LedController::new(self)
    }

    /// Detect one tag. See [`DetectionLoop::scan`].
    pub fn scan(&self) -> Result<TagOf<C>> {
        self.detector().scan()
    }

    /// Detect tags until `on_tag` returns `false`. See [`DetectionLoop::scan_with`].
    pub fn scan_with<F>(&self, on_tag: F) -> Result<TagOf<C>>
    where
        F: FnMut(&TagOf<C>) -> bool,
    {
        self.detector().scan_with(on_tag)
    }

    /// Apply a LED intent. See [`LedController::toggle`].
    pub fn toggle(&self, intent: Option<&LedIntent>) -> Result<Color> {
        self.led().toggle(intent)
    }

    /// Read back the LED color. See [`LedController::query_state`].
    pub fn query_state(&self) -> Result<Color> {
        self.led().query_state()
    }

    /// Enter the reader's critical section.
    ///
    /// Blocks while another thread holds the lock. The lock is released when
    /// the returned guard is dropped, on every exit path.
    pub(crate) fn lock(&self) -> ReaderGuard<'_, C> {
        let started = Instant::now();
        let slot = self.device.lock().unwrap_or_else(|poisoned| {
            warn!("Reader lock poisoned by a panicking holder, recovering");
            self.device.clear_poison();
            poisoned.into_inner()
        });

        let waited = started.elapsed();
        if let Some(limit) = self.config.lock_wait_warning()
            && waited > limit
        {
            warn!("Waited {}ms for the reader lock", waited.as_millis());
        }

        ReaderGuard {
            slot,
            connector: &self.connector,
            config: &self.config,
        }
    }

    /// Switch the field off, disable infinite passive listen and deselect.
    ///
    /// Every step is attempted even if an earlier one fails; the first
    /// failure is returned. Does nothing if no reader is connected.
    pub(crate) fn release_field(&self) -> Result<()> {
        let mut guard = self.lock();
        guard
            .run_if_connected(|device| {
                let steps = [
                    device.configure(ConfigurationOption::ActivateField, flag(false)),
                    device.configure(ConfigurationOption::InfiniteListPassive, flag(false)),
                    device.deselect(),
                ];
                steps.into_iter().collect::<Result<Vec<()>>>().map(|_| ())
            })
            .unwrap_or(Ok(()))
    }
}

/// Exclusive access to the reader slot, held for one critical section.
pub(crate) struct ReaderGuard<'r, C: Connector> {
    slot: MutexGuard<'r, Option<C::Device>>,
    connector: &'r C,
    config: &'r ReaderConfig,
}

impl<C: Connector> ReaderGuard<'_, C> {
    /// Run `f` against the device, connecting first if needed.
    ///
    /// A connection error from `f` drops the connection so the next critical
    /// section reconnects. An invalid configuration fails with
    /// [`ReaderError::Config`] before the connector is called.
    pub(crate) fn run<T>(&mut self, f: impl FnOnce(&mut C::Device) -> Result<T>) -> Result<T> {
        if self.slot.is_none() {
            self.config.validate()?;
            info!("Connecting to reader");
            let device = self.connector.connect(self.config)?;
            *self.slot = Some(device);
        }
        let device = self
            .slot
            .as_mut()
            .ok_or_else(|| ReaderError::connection("reader slot empty after connect"))?;

        let result = f(device);
        self.forget_if_lost(&result);
        result
    }

    /// Run `f` only if a reader is already connected.
    pub(crate) fn run_if_connected<T>(
        &mut self,
        f: impl FnOnce(&mut C::Device) -> Result<T>,
    ) -> Option<Result<T>> {
        let device = self.slot.as_mut()?;
        let result = f(device);
        self.forget_if_lost(&result);
        Some(result)
    }

    fn forget_if_lost<T>(&mut self, result: &Result<T>) {
        if let Err(e) = result
            && e.is_connection_lost()
        {
            warn!("Reader connection lost: {}", e);
            *self.slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{DeviceOp, MockDevice};

    #[test]
    fn test_connects_lazily_once() {
        let (_device, control) = MockDevice::new();
        let reader = ReaderHandle::new(ReaderConfig::default(), control.connector());
        assert_eq!(control.connect_count(), 0);

        reader.query_state().unwrap();
        reader.query_state().unwrap();
        assert_eq!(control.connect_count(), 1);
    }

    #[test]
    fn test_connect_failure_is_connection_error() {
        let (_device, control) = MockDevice::new();
        control.set_reader_present(false);
        let reader = ReaderHandle::new(ReaderConfig::default(), control.connector());

        let err = reader.query_state().unwrap_err();
        assert!(err.is_connection_lost());
        assert!(!reader.is_connected());

        control.set_reader_present(true);
        assert_eq!(reader.query_state().unwrap(), Color::None);
        assert!(reader.is_connected());
    }

    #[test]
    fn test_blank_connstring_fails_before_connect() {
        let (_device, control) = MockDevice::new();
        let config = ReaderConfig::default().with_connstring("   ");
        let reader = ReaderHandle::new(config, control.connector());

        assert!(matches!(
            reader.query_state(),
            Err(ReaderError::Config { .. })
        ));
        assert!(matches!(reader.scan(), Err(ReaderError::Config { .. })));
        assert_eq!(control.connect_count(), 0);
        assert!(control.journal().is_empty());
    }

    #[test]
    fn test_disconnect_forces_reconnect() {
        let (_device, control) = MockDevice::new();
        let reader = ReaderHandle::new(ReaderConfig::default(), control.connector());

        reader.query_state().unwrap();
        reader.disconnect();
        assert!(!reader.is_connected());
        reader.query_state().unwrap();
        assert_eq!(control.connect_count(), 2);
    }

    #[test]
    fn test_lost_connection_dropped() {
        let (_device, control) = MockDevice::new();
        let reader = ReaderHandle::new(ReaderConfig::default(), control.connector());

        control.fail_next_led(ReaderError::connection("USB unplugged"));
        assert!(reader.query_state().unwrap_err().is_connection_lost());
        assert!(!reader.is_connected());
    }

    #[test]
    fn test_release_field_without_connection_is_noop() {
        let (_device, control) = MockDevice::new();
        let reader = ReaderHandle::new(ReaderConfig::default(), control.connector());

        reader.release_field().unwrap();
        assert_eq!(control.connect_count(), 0);
        assert!(control.journal().is_empty());
    }

    #[test]
    fn test_release_field_attempts_every_step() {
        let (_device, control) = MockDevice::new();
        let reader = ReaderHandle::new(ReaderConfig::default(), control.connector());
        reader.query_state().unwrap();
        control.clear_journal();

        control.fail_next_configure(
            ConfigurationOption::ActivateField,
            ReaderError::device("configure", "rejected"),
        );
        let err = reader.release_field().unwrap_err();
        assert!(matches!(err, ReaderError::Device { .. }));
        assert_eq!(
            control.journal(),
            vec![
                DeviceOp::Configure(ConfigurationOption::ActivateField, 0),
                DeviceOp::Configure(ConfigurationOption::InfiniteListPassive, 0),
                DeviceOp::Deselect,
            ]
        );
    }
}
