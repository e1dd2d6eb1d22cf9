//! File system interface trait
//!
//! The parameter store persists its table through this interface. On the
//! target it is backed by the SPIFFS/LittleFS partition of the ESP32 flash;
//! on host it is backed by `MockFileSystem`.

use crate::platform::Result;

/// How a file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "esp32", derive(defmt::Format))]
pub enum OpenMode {
    /// Open an existing file for reading from the start
    Read,
    /// Create the file, or truncate it if it exists, and write from the start
    WriteTruncate,
}

/// An open file handle
pub trait File {
    /// Read up to `buf.len()` bytes, returning the number of bytes read
    ///
    /// Returns `Ok(0)` at end of file.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write `data`, returning the number of bytes accepted
    ///
    /// A short count means the medium refused the remaining bytes; callers
    /// treat it as a write failure.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Current size of the file in bytes
    fn size(&self) -> usize;

    /// Close the file, flushing any buffered data
    fn close(self) -> Result<()>;
}

/// File system interface trait
///
/// # Safety Invariants
///
/// - Only one owner per file system instance (no concurrent access)
/// - Paths are absolute, e.g. `"/wifi.nvm"`
pub trait FileSystem {
    /// Open file handle type
    type File: File;

    /// Whether the storage medium is mounted and usable
    fn is_available(&self) -> bool;

    /// Whether a file exists at `path`
    fn exists(&self, path: &str) -> bool;

    /// Open a file
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::File(FileError::NotFound)` when opening a missing
    /// file for reading, `FileError::Unavailable` when the medium is not
    /// mounted, and `FileError::OpenFailed` for any other failure.
    fn open(&mut self, path: &str, mode: OpenMode) -> Result<Self::File>;
}
