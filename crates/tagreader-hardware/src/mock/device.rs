//! Mock reader implementation for testing and development.
//!
//! This module provides a simulated reader that records every call it
//! receives and can be scripted to present tags or fail specific operations,
//! so the detection loop and LED controller can be exercised without
//! physical hardware.

use crate::config::ReaderConfig;
use crate::traits::Device;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tagreader_core::{Color, ConfigurationOption, Modulation, RawLedCommand, ReaderError, Result};

/// Tag presented by a [`MockDevice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockTag {
    pub uid: Vec<u8>,
}

impl MockTag {
    pub fn uid_hex(&self) -> String {
        self.uid.iter().map(|b| format!("{:02X}", b)).collect()
    }
}

/// One call received by a [`MockDevice`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceOp {
    Configure(ConfigurationOption, i32),
    Select(Modulation),
    Deselect,
    Led(RawLedCommand),
}

#[derive(Debug)]
struct MockState {
    reader_present: bool,
    journal: Vec<DeviceOp>,
    field_active: bool,
    infinite_listen: bool,
    handle_crc: bool,
    handle_parity: bool,
    led_color: Color,
    led_status_override: Option<u8>,
    select_script: VecDeque<Result<Vec<u8>>>,
    configure_failures: HashMap<ConfigurationOption, VecDeque<ReaderError>>,
    deselect_calls: usize,
    deselect_failures: HashMap<usize, ReaderError>,
    led_failures: VecDeque<ReaderError>,
    op_delay: Duration,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            reader_present: true,
            journal: Vec::new(),
            field_active: false,
            infinite_listen: false,
            handle_crc: false,
            handle_parity: false,
            led_color: Color::None,
            led_status_override: None,
            select_script: VecDeque::new(),
            configure_failures: HashMap::new(),
            deselect_calls: 0,
            deselect_failures: HashMap::new(),
            led_failures: VecDeque::new(),
            op_delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<MockState>,
    connects: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark one device call as running, hold it for the configured delay,
    /// then apply `f` to the state.
    fn call<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let delay = self.state().op_delay;
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        let result = f(&mut self.state());

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Mock reader for testing and development.
///
/// Cloning a `MockDevice` yields another connection to the same simulated
/// reader.
///
/// # Examples
///
/// ```
/// use tagreader_core::{ConfigurationOption, Modulation};
/// use tagreader_hardware::mock::{DeviceOp, MockDevice};
/// use tagreader_hardware::traits::Device;
///
/// # fn main() -> tagreader_core::Result<()> {
/// let (mut device, control) = MockDevice::new();
/// control.push_tag(vec![0x04, 0xAB, 0xCD, 0xEF]);
///
/// device.configure(ConfigurationOption::ActivateField, 1)?;
/// let tag = device.select(Modulation::ISO14443A_106)?;
/// assert_eq!(tag.uid_hex(), "04ABCDEF");
/// assert_eq!(control.journal().len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockDevice {
    shared: Arc<Shared>,
}

impl MockDevice {
    /// Create a simulated reader and the handle that controls it.
    pub fn new() -> (Self, MockDeviceHandle) {
        let shared = Arc::new(Shared::default());
        (
            Self {
                shared: Arc::clone(&shared),
            },
            MockDeviceHandle { shared },
        )
    }
}

impl Device for MockDevice {
    type Tag = MockTag;

    fn configure(&mut self, option: ConfigurationOption, value: i32) -> Result<()> {
        self.shared.call(|state| {
            state.journal.push(DeviceOp::Configure(option, value));
            if let Some(error) = state
                .configure_failures
                .get_mut(&option)
                .and_then(VecDeque::pop_front)
            {
                return Err(error);
            }

            let enabled = value != 0;
            match option {
                ConfigurationOption::ActivateField => state.field_active = enabled,
                ConfigurationOption::InfiniteListPassive => state.infinite_listen = enabled,
                ConfigurationOption::HandleCrc => state.handle_crc = enabled,
                ConfigurationOption::HandleParity => state.handle_parity = enabled,
                _ => {}
            }
            Ok(())
        })
    }

    fn select(&mut self, modulation: Modulation) -> Result<MockTag> {
        self.shared.call(|state| {
            state.journal.push(DeviceOp::Select(modulation));
            if !state.field_active {
                return Err(ReaderError::device("select", "RF field is off"));
            }

            match state.select_script.pop_front() {
                Some(Ok(uid)) => Ok(MockTag { uid }),
                Some(Err(error)) => Err(error),
                None if state.infinite_listen => {
                    Err(ReaderError::device("select", "no more scripted tags"))
                }
                None => Err(ReaderError::device("select", "no tag present")),
            }
        })
    }

    fn deselect(&mut self) -> Result<()> {
        self.shared.call(|state| {
            state.journal.push(DeviceOp::Deselect);
            state.deselect_calls += 1;
            match state.deselect_failures.remove(&state.deselect_calls) {
                Some(error) => Err(error),
                None => Ok(()),
            }
        })
    }

    fn led(&mut self, state_byte: u8, on_ticks: u16, off_ticks: u16, repeat: u8) -> Result<u8> {
        self.shared.call(|state| {
            let command = RawLedCommand::new(state_byte, on_ticks, off_ticks, repeat);
            state.journal.push(DeviceOp::Led(command));
            if let Some(error) = state.led_failures.pop_front() {
                return Err(error);
            }

            if !command.is_query() {
                state.led_color = Color::from_request_code(state_byte);
            }
            Ok(state
                .led_status_override
                .unwrap_or_else(|| state.led_color.status_code()))
        })
    }
}

/// Handle for controlling and inspecting a [`MockDevice`].
#[derive(Debug, Clone)]
pub struct MockDeviceHandle {
    shared: Arc<Shared>,
}

impl MockDeviceHandle {
    /// Connector that hands out connections to this simulated reader.
    ///
    /// Fails with a connection error while the reader is marked absent.
    pub fn connector(&self) -> impl Fn(&ReaderConfig) -> Result<MockDevice> + Send + Sync + use<> {
        let shared = Arc::clone(&self.shared);
        move |_config: &ReaderConfig| {
            if !shared.state().reader_present {
                return Err(ReaderError::connection("no reader found"));
            }
            shared.connects.fetch_add(1, Ordering::SeqCst);
            Ok(MockDevice {
                shared: Arc::clone(&shared),
            })
        }
    }

    pub fn set_reader_present(&self, present: bool) {
        self.shared.state().reader_present = present;
    }

    pub fn connect_count(&self) -> usize {
        self.shared.connects.load(Ordering::SeqCst)
    }

    /// Queue a tag for the next `select`.
    pub fn push_tag(&self, uid: Vec<u8>) {
        self.shared.state().select_script.push_back(Ok(uid));
    }

    /// Queue a failure for the next `select`.
    pub fn push_select_error(&self, error: ReaderError) {
        self.shared.state().select_script.push_back(Err(error));
    }

    pub fn fail_next_configure(&self, option: ConfigurationOption, error: ReaderError) {
        self.shared
            .state()
            .configure_failures
            .entry(option)
            .or_default()
            .push_back(error);
    }

    pub fn fail_next_deselect(&self, error: ReaderError) {
        self.fail_nth_deselect(1, error);
    }

    /// Fail the `n`th `deselect` from now, counting from 1.
    pub fn fail_nth_deselect(&self, n: usize, error: ReaderError) {
        let mut state = self.shared.state();
        let call = state.deselect_calls + n;
        state.deselect_failures.insert(call, error);
    }

    pub fn fail_next_led(&self, error: ReaderError) {
        self.shared.state().led_failures.push_back(error);
    }

    /// Answer every LED command with `status` instead of the simulated color.
    pub fn set_led_status(&self, status: Option<u8>) {
        self.shared.state().led_status_override = status;
    }

    /// Set the simulated LED color directly.
    pub fn set_led_color(&self, color: Color) {
        self.shared.state().led_color = color;
    }

    pub fn led_color(&self) -> Color {
        self.shared.state().led_color
    }

    /// Hold every device call for `delay` before completing it.
    pub fn set_op_delay(&self, delay: Duration) {
        self.shared.state().op_delay = delay;
    }

    pub fn journal(&self) -> Vec<DeviceOp> {
        self.shared.state().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.shared.state().journal.clear();
    }

    /// LED commands received so far.
    pub fn led_commands(&self) -> Vec<RawLedCommand> {
        self.shared
            .state()
            .journal
            .iter()
            .filter_map(|op| match op {
                DeviceOp::Led(command) => Some(*command),
                _ => None,
            })
            .collect()
    }

    pub fn select_count(&self) -> usize {
        self.shared
            .state()
            .journal
            .iter()
            .filter(|op| matches!(op, DeviceOp::Select(_)))
            .count()
    }

    pub fn field_active(&self) -> bool {
        self.shared.state().field_active
    }

    pub fn infinite_listen(&self) -> bool {
        self.shared.state().infinite_listen
    }

    /// Whether CRC and parity handling are both enabled.
    pub fn framing_checks_enabled(&self) -> bool {
        let state = self.shared.state();
        state.handle_crc && state.handle_parity
    }

    /// Highest number of device calls observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.shared.max_in_flight.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_requires_field() {
        let (mut device, control) = MockDevice::new();
        control.push_tag(vec![1, 2, 3, 4]);

        let err = device.select(Modulation::ISO14443A_106).unwrap_err();
        assert!(matches!(err, ReaderError::Device { operation: "select", .. }));
    }

    #[test]
    fn test_select_without_tag() {
        let (mut device, _control) = MockDevice::new();
        device.configure(ConfigurationOption::ActivateField, 1).unwrap();
        assert!(device.select(Modulation::ISO14443A_106).is_err());
    }

    #[test]
    fn test_led_tracks_final_color() {
        let (mut device, control) = MockDevice::new();
        assert_eq!(device.led(0b1101, 0, 0, 0).unwrap(), Color::Red.status_code());
        assert_eq!(control.led_color(), Color::Red);

        // A query leaves the color alone.
        assert_eq!(device.led(0, 0, 0, 0).unwrap(), Color::Red.status_code());
        assert_eq!(control.led_commands().len(), 2);
    }

    #[test]
    fn test_led_status_override() {
        let (mut device, control) = MockDevice::new();
        control.set_led_status(Some(9));
        assert_eq!(device.led(0, 0, 0, 0).unwrap(), 9);
    }

    #[test]
    fn test_injected_failures_are_one_shot() {
        let (mut device, control) = MockDevice::new();
        control.fail_next_deselect(ReaderError::device("deselect", "boom"));

        assert!(device.deselect().is_err());
        assert!(device.deselect().is_ok());
        assert_eq!(control.journal(), vec![DeviceOp::Deselect, DeviceOp::Deselect]);
    }

    #[test]
    fn test_connector_respects_presence() {
        let (_device, control) = MockDevice::new();
        let connect = control.connector();
        control.set_reader_present(false);
        assert!(connect(&ReaderConfig::default()).is_err());
        control.set_reader_present(true);
        assert!(connect(&ReaderConfig::default()).is_ok());
        assert_eq!(control.connect_count(), 1);
    }

    #[test]
    fn test_connector_outlives_handle() {
        let connect = {
            let (_device, control) = MockDevice::new();
            control.connector()
        };
        assert!(connect(&ReaderConfig::default()).is_ok());
    }

    #[test]
    fn test_handle_moves_after_connector_built() {
        let (_device, control) = MockDevice::new();
        let connect = control.connector();
        let moved = control;
        assert!(connect(&ReaderConfig::default()).is_ok());
        assert_eq!(moved.connect_count(), 1);
    }
}
