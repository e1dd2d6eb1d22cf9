//! Platform error types
//!
//! This module defines error types for platform operations.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All platform implementations map their SDK-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "esp32", derive(defmt::Format))]
pub enum PlatformError {
    /// File system operation failed
    File(FileError),
    /// Radio operation failed
    Radio(RadioError),
    /// Timer operation failed
    Timer(TimerError),
    /// Platform initialization failed
    InitializationFailed,
    /// Invalid configuration provided
    InvalidConfig,
    /// Resource not available
    ResourceUnavailable,
}

/// File system errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "esp32", derive(defmt::Format))]
pub enum FileError {
    /// Storage medium not mounted
    Unavailable,
    /// File does not exist
    NotFound,
    /// Open failed
    OpenFailed,
    /// Read operation failed
    ReadFailed,
    /// Write operation failed (fewer bytes accepted than requested)
    WriteFailed,
    /// Out of space or out of memory
    NoSpace,
}

/// Radio (WiFi / ESP-NOW) errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "esp32", derive(defmt::Format))]
pub enum RadioError {
    /// Setting the radio mode register failed
    ModeFailed,
    /// Setting the protocol bits failed
    ProtocolFailed,
    /// Channel out of range or rejected by the radio
    InvalidChannel,
    /// Network scan failed; carries the SDK error code
    ScanFailed(i16),
    /// Station connect request rejected
    ConnectFailed,
    /// Station disconnect failed
    DisconnectFailed,
    /// Soft-AP configuration failed
    AccessPointFailed,
    /// DNS server start/stop failed
    DnsFailed,
    /// Hostname rejected
    HostnameFailed,
    /// Promiscuous mode or callback setup failed
    PromiscuousFailed,
    /// ESP-NOW layer call failed
    EspNowFailed,
    /// Operation requires a personality that is not online
    NotOnline,
    /// Wait for an asynchronous radio condition timed out
    Timeout,
}

/// Timer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "esp32", derive(defmt::Format))]
pub enum TimerError {
    /// Timer overflow
    Overflow,
    /// Invalid duration
    InvalidDuration,
}

impl From<FileError> for PlatformError {
    fn from(error: FileError) -> Self {
        PlatformError::File(error)
    }
}

impl From<RadioError> for PlatformError {
    fn from(error: RadioError) -> Self {
        PlatformError::Radio(error)
    }
}

impl From<TimerError> for PlatformError {
    fn from(error: TimerError) -> Self {
        PlatformError::Timer(error)
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::File(e) => write!(f, "File error: {:?}", e),
            PlatformError::Radio(e) => write!(f, "Radio error: {:?}", e),
            PlatformError::Timer(e) => write!(f, "Timer error: {:?}", e),
            PlatformError::InitializationFailed => write!(f, "Platform initialization failed"),
            PlatformError::InvalidConfig => write!(f, "Invalid configuration"),
            PlatformError::ResourceUnavailable => write!(f, "Resource not available"),
        }
    }
}
