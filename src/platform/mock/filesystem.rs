//! Mock file system implementation for testing
//!
//! Provides an in-memory file map for unit tests.

use crate::platform::{
    error::FileError,
    traits::{File, FileSystem, OpenMode},
    Result,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

#[derive(Debug)]
struct FsState {
    files: HashMap<String, Vec<u8>>,
    available: bool,
    /// Remaining bytes the medium will accept before writes start failing
    write_budget: Option<usize>,
    bytes_written: usize,
}

/// Mock file system
///
/// Simulates a flash file system in memory. Supports:
/// - Unavailable medium (not mounted)
/// - Write failure injection after a byte budget (partial files stay on disk)
/// - Direct inspection and corruption of file contents
///
/// # Example
///
/// ```ignore
/// use esp_robot::platform::mock::MockFileSystem;
/// use esp_robot::platform::traits::{File, FileSystem, OpenMode};
///
/// let mut fs = MockFileSystem::new();
/// let mut file = fs.open("/params.nvm", OpenMode::WriteTruncate).unwrap();
/// file.write(b"abc\0").unwrap();
/// file.close().unwrap();
/// assert_eq!(fs.contents("/params.nvm").unwrap(), b"abc\0");
/// ```
#[derive(Debug)]
pub struct MockFileSystem {
    state: Rc<RefCell<FsState>>,
}

impl MockFileSystem {
    /// Create an empty, mounted file system
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(FsState {
                files: HashMap::new(),
                available: true,
                write_budget: None,
                bytes_written: 0,
            })),
        }
    }

    /// Create a file system whose medium is not mounted
    pub fn unavailable() -> Self {
        let fs = Self::new();
        fs.set_available(false);
        fs
    }

    /// Mount or unmount the medium
    pub fn set_available(&self, available: bool) {
        self.state.borrow_mut().available = available;
    }

    /// Create or replace a file
    pub fn insert_file(&self, path: &str, contents: &[u8]) {
        self.state
            .borrow_mut()
            .files
            .insert(path.to_string(), contents.to_vec());
    }

    /// Delete a file
    pub fn remove_file(&self, path: &str) {
        self.state.borrow_mut().files.remove(path);
    }

    /// Contents of a file (for test verification)
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.state.borrow().files.get(path).cloned()
    }

    /// Accept only `bytes` more bytes; later writes are short
    pub fn fail_writes_after(&self, bytes: usize) {
        self.state.borrow_mut().write_budget = Some(bytes);
    }

    /// Remove the write failure injection
    pub fn clear_write_failure(&self) {
        self.state.borrow_mut().write_budget = None;
    }

    /// Total bytes accepted by all writes so far
    pub fn bytes_written(&self) -> usize {
        self.state.borrow().bytes_written
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock open file
#[derive(Debug)]
pub struct MockFile {
    state: Rc<RefCell<FsState>>,
    path: String,
    mode: OpenMode,
    position: usize,
}

impl File for MockFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.mode != OpenMode::Read {
            return Err(FileError::ReadFailed.into());
        }
        let state = self.state.borrow();
        let data = state.files.get(&self.path).ok_or(FileError::NotFound)?;
        let remaining = data.len().saturating_sub(self.position);
        let count = remaining.min(buf.len());
        buf[..count].copy_from_slice(&data[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if self.mode != OpenMode::WriteTruncate {
            return Err(FileError::WriteFailed.into());
        }
        let mut state = self.state.borrow_mut();
        let budget = state.write_budget;
        let accepted = match budget {
            Some(budget) => {
                let accepted = budget.min(data.len());
                state.write_budget = Some(budget - accepted);
                accepted
            }
            None => data.len(),
        };
        state.bytes_written += accepted;
        let file = state.files.entry(self.path.clone()).or_default();
        file.extend_from_slice(&data[..accepted]);
        self.position += accepted;
        Ok(accepted)
    }

    fn size(&self) -> usize {
        self.state
            .borrow()
            .files
            .get(&self.path)
            .map(|f| f.len())
            .unwrap_or(0)
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}

impl FileSystem for MockFileSystem {
    type File = MockFile;

    fn is_available(&self) -> bool {
        self.state.borrow().available
    }

    fn exists(&self, path: &str) -> bool {
        let state = self.state.borrow();
        state.available && state.files.contains_key(path)
    }

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<Self::File> {
        let mut state = self.state.borrow_mut();
        if !state.available {
            return Err(FileError::Unavailable.into());
        }
        match mode {
            OpenMode::Read => {
                if !state.files.contains_key(path) {
                    return Err(FileError::NotFound.into());
                }
            }
            OpenMode::WriteTruncate => {
                state.files.insert(path.to_string(), Vec::new());
            }
        }
        Ok(MockFile {
            state: Rc::clone(&self.state),
            path: path.to_string(),
            mode,
            position: 0,
        })
    }
}
