//! Mock device implementations for testing and development.
//!
//! This module provides a simulated reader that can be controlled
//! programmatically without physical hardware.

pub mod device;

pub use device::{DeviceOp, MockDevice, MockDeviceHandle, MockTag};
