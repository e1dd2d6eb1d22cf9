//! Platform abstraction layer
//!
//! This module provides the hardware abstraction the core subsystems call
//! through. Register-level drivers, the WiFi SDK and the flash file system
//! live behind these traits and are supplied by the board support crate.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{FileError, PlatformError, RadioError, Result, TimerError};
pub use traits::{File, FileSystem, OpenMode, RadioInterface, TimerInterface};
