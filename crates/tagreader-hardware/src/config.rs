//! Reader configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tagreader_core::{ReaderError, Result};

/// Default threshold for the slow lock acquisition warning.
pub const DEFAULT_LOCK_WAIT_WARNING_MS: u64 = 1000;

/// Configuration for a [`ReaderHandle`](crate::reader::ReaderHandle).
///
/// # Examples
///
/// ```
/// use tagreader_hardware::ReaderConfig;
///
/// let config = ReaderConfig::default()
///     .with_connstring("pn53x_usb:001:004")
///     .with_lock_wait_warning_ms(250);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Driver-specific reader address. `None` picks the first reader found.
    pub connstring: Option<String>,

    /// Log a warning when waiting for the reader lock takes longer than
    /// this many milliseconds. `0` disables the warning.
    pub lock_wait_warning_ms: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            connstring: None,
            lock_wait_warning_ms: DEFAULT_LOCK_WAIT_WARNING_MS,
        }
    }
}

impl ReaderConfig {
    pub fn with_connstring(mut self, connstring: impl Into<String>) -> Self {
        self.connstring = Some(connstring.into());
        self
    }

    pub fn with_lock_wait_warning_ms(mut self, ms: u64) -> Self {
        self.lock_wait_warning_ms = ms;
        self
    }

    /// Threshold for the slow lock warning, if enabled.
    pub fn lock_wait_warning(&self) -> Option<Duration> {
        (self.lock_wait_warning_ms > 0).then(|| Duration::from_millis(self.lock_wait_warning_ms))
    }

    /// Check the configuration for values no driver could accept.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Config`] if the connection string is present
    /// but blank.
    pub fn validate(&self) -> Result<()> {
        if let Some(connstring) = &self.connstring
            && connstring.trim().is_empty()
        {
            return Err(ReaderError::config("connstring must not be blank"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReaderConfig::default();
        assert_eq!(config.connstring, None);
        assert_eq!(config.lock_wait_warning(), Some(Duration::from_secs(1)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_warning_disabled() {
        let config = ReaderConfig::default().with_lock_wait_warning_ms(0);
        assert_eq!(config.lock_wait_warning(), None);
    }

    #[test]
    fn test_blank_connstring_rejected() {
        let config = ReaderConfig::default().with_connstring("  ");
        assert!(matches!(
            config.validate(),
            Err(ReaderError::Config { .. })
        ));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ReaderConfig =
            serde_json::from_str(r#"{"connstring": "pn532_uart:/dev/ttyUSB0"}"#).unwrap();
        assert_eq!(config.connstring.as_deref(), Some("pn532_uart:/dev/ttyUSB0"));
        assert_eq!(config.lock_wait_warning_ms, DEFAULT_LOCK_WAIT_WARNING_MS);
    }
}
