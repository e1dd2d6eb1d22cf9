//! Mock platform implementation for testing
//!
//! This module provides mock implementations of platform traits that can be used
//! for unit testing without requiring actual hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```ignore
//! use esp_robot::platform::mock::{MockRadio, MockTimer};
//! use esp_robot::radio::{RadioConfig, RadioCoordinator, RadioEvents};
//!
//! let events = RadioEvents::new();
//! let mut coordinator =
//!     RadioCoordinator::new(MockRadio::new(), MockTimer::new(), RadioConfig::default(), &events);
//! coordinator.enable(true, false, false, None)?;
//! ```

#![cfg(any(test, feature = "mock"))]

mod filesystem;
mod radio;
mod timer;

pub use filesystem::{MockFile, MockFileSystem};
pub use radio::{MockRadio, RadioCall};
pub use timer::MockTimer;
