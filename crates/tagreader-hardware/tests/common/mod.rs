//! Common test utilities for integration tests.
//!
//! Builds mock-backed readers and the expected device call sequences for a
//! detection cycle and for the final cleanup pass.

#![allow(dead_code)]

use tagreader_core::{ConfigurationOption, Modulation, flag};
use tagreader_hardware::mock::{DeviceOp, MockDevice, MockDeviceHandle};
use tagreader_hardware::{Connector, ReaderConfig, ReaderHandle};

/// Install a test-friendly tracing subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Mock reader with `tags` queued, plus a handle over it.
pub fn reader_with_tags(
    tags: &[&[u8]],
) -> (ReaderHandle<impl Connector<Device = MockDevice>>, MockDeviceHandle) {
    init_tracing();
    let (_device, control) = MockDevice::new();
    for uid in tags {
        control.push_tag(uid.to_vec());
    }
    let reader = ReaderHandle::new(ReaderConfig::default(), control.connector());
    (reader, control)
}

/// Device calls of one detection cycle.
pub fn cycle_ops(listen: bool) -> Vec<DeviceOp> {
    vec![
        DeviceOp::Configure(ConfigurationOption::ActivateField, 0),
        DeviceOp::Configure(ConfigurationOption::InfiniteListPassive, flag(listen)),
        DeviceOp::Configure(ConfigurationOption::HandleCrc, 1),
        DeviceOp::Configure(ConfigurationOption::HandleParity, 1),
        DeviceOp::Configure(ConfigurationOption::ActivateField, 1),
        DeviceOp::Select(Modulation::ISO14443A_106),
        DeviceOp::Deselect,
    ]
}

/// Device calls of a cycle that failed in `select`.
pub fn failed_cycle_ops(listen: bool) -> Vec<DeviceOp> {
    let mut ops = cycle_ops(listen);
    ops.pop();
    ops
}

/// Device calls of the final cleanup pass.
pub fn cleanup_ops() -> Vec<DeviceOp> {
    vec![
        DeviceOp::Configure(ConfigurationOption::ActivateField, 0),
        DeviceOp::Configure(ConfigurationOption::InfiniteListPassive, 0),
        DeviceOp::Deselect,
    ]
}

/// Assert the reader was left with the field off and not listening.
pub fn assert_reader_idle(control: &MockDeviceHandle) {
    assert!(!control.field_active(), "RF field left active");
    assert!(!control.infinite_listen(), "infinite passive listen left enabled");
}
