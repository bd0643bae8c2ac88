//! Reader device trait definitions.
//!
//! [`Device`] is the contract between the detection loop / LED controller
//! and whatever driver actually talks to the reader over USB or serial.
//! [`Connector`] produces a connected [`Device`] on demand so that
//! [`ReaderHandle`](crate::reader::ReaderHandle) can connect lazily.
//!
//! Unlike async peripheral traits, every method here is a plain blocking
//! call: reader drivers block inside `select` while infinite passive listen
//! is enabled, and the call cannot be interrupted from this layer. Use the
//! [`task`](crate::task) module to drive a reader from async code.

use crate::config::ReaderConfig;
use tagreader_core::{ConfigurationOption, Modulation, Result};

/// Contactless reader capability.
///
/// Implementations must be `Send` so a [`ReaderHandle`] can be shared between
/// threads; the handle guarantees that at most one method is running at a
/// time, so implementations do not need interior synchronisation.
///
/// Methods that fail because the reader is gone should report
/// [`ReaderError::Connection`](tagreader_core::ReaderError::Connection); the
/// handle then drops the connection and reconnects on next use. Any other
/// hardware failure is a [`ReaderError::Device`](tagreader_core::ReaderError::Device).
///
/// [`ReaderHandle`]: crate::reader::ReaderHandle
///
/// # Examples
///
/// ```no_run
/// use tagreader_core::{ConfigurationOption, Modulation, Result, flag};
/// use tagreader_hardware::traits::Device;
///
/// fn detect_once<D: Device>(device: &mut D) -> Result<D::Tag> {
///     device.configure(ConfigurationOption::ActivateField, flag(true))?;
///     let tag = device.select(Modulation::ISO14443A_106)?;
///     device.deselect()?;
///     Ok(tag)
/// }
/// ```
pub trait Device: Send {
    /// Opaque tag produced by a successful [`select`](Device::select).
    type Tag: Send;

    /// Set a reader option. Boolean options take `0` or `1`.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader rejects the option or the
    /// transport fails.
    fn configure(&mut self, option: ConfigurationOption, value: i32) -> Result<()>;

    /// Select a tag with the given modulation.
    ///
    /// Blocks until a tag appears when infinite passive listen is enabled,
    /// otherwise returns immediately (failing when no tag is present).
    fn select(&mut self, modulation: Modulation) -> Result<Self::Tag>;

    /// Release the currently selected tag.
    fn deselect(&mut self) -> Result<()>;

    /// Send a raw LED command and return the reader's status byte.
    fn led(&mut self, state: u8, on_ticks: u16, off_ticks: u16, repeat: u8) -> Result<u8>;
}

/// Factory for connected [`Device`]s.
///
/// Implemented for every `Fn(&ReaderConfig) -> Result<D>` closure, which is
/// usually all a driver needs:
///
/// ```no_run
/// # use tagreader_core::{ConfigurationOption, Modulation, Result, ReaderError};
/// # use tagreader_hardware::traits::Device;
/// # use tagreader_hardware::{ReaderConfig, ReaderHandle};
/// # struct UsbReader;
/// # impl UsbReader { fn open(_: Option<&str>) -> Result<Self> { Err(ReaderError::connection("none")) } }
/// # impl Device for UsbReader {
/// #     type Tag = Vec<u8>;
/// #     fn configure(&mut self, _: ConfigurationOption, _: i32) -> Result<()> { Ok(()) }
/// #     fn select(&mut self, _: Modulation) -> Result<Vec<u8>> { Ok(vec![]) }
/// #     fn deselect(&mut self) -> Result<()> { Ok(()) }
/// #     fn led(&mut self, _: u8, _: u16, _: u16, _: u8) -> Result<u8> { Ok(0) }
/// # }
/// let reader = ReaderHandle::new(ReaderConfig::default(), |config: &ReaderConfig| {
///     UsbReader::open(config.connstring.as_deref())
/// });
/// ```
pub trait Connector: Send + Sync {
    type Device: Device;

    /// Establish a connection to a reader.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Connection`](tagreader_core::ReaderError::Connection)
    /// if no reader is present.
    fn connect(&self, config: &ReaderConfig) -> Result<Self::Device>;
}

impl<F, D> Connector for F
where
    F: Fn(&ReaderConfig) -> Result<D> + Send + Sync,
    D: Device,
{
    type Device = D;

    fn connect(&self, config: &ReaderConfig) -> Result<D> {
        self(config)
    }
}
