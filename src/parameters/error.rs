//! Parameter error types
//!
//! Provides error types for parameter store operations.

use crate::platform::PlatformError;
use core::fmt;

/// Errors from parameter store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "esp32", derive(defmt::Format))]
pub enum ParameterError {
    /// No descriptor with that name
    UnknownParameter,
    /// Value text unparsable or out of range
    InvalidValue,
    /// Parameter file does not exist
    FileMissing,
    /// Parameter file holds zero bytes
    EmptyFile,
    /// Final record lacks one of its three fields
    TruncatedRecord,
    /// Record type disagrees with the descriptor
    TypeMismatch,
    /// Storage medium not mounted
    StorageUnavailable,
    /// Underlying file operation failed
    Io(PlatformError),
}

/// Result type for parameter operations
pub type Result<T> = core::result::Result<T, ParameterError>;

impl From<PlatformError> for ParameterError {
    fn from(error: PlatformError) -> Self {
        ParameterError::Io(error)
    }
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::UnknownParameter => write!(f, "unknown parameter"),
            ParameterError::InvalidValue => write!(f, "invalid parameter value"),
            ParameterError::FileMissing => write!(f, "parameter file missing"),
            ParameterError::EmptyFile => write!(f, "parameter file empty"),
            ParameterError::TruncatedRecord => write!(f, "truncated parameter record"),
            ParameterError::TypeMismatch => write!(f, "parameter type mismatch"),
            ParameterError::StorageUnavailable => write!(f, "parameter storage unavailable"),
            ParameterError::Io(e) => write!(f, "parameter file I/O: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::FileError;
    use std::string::ToString;

    #[test]
    fn test_io_conversion_and_display() {
        let err: ParameterError = PlatformError::File(FileError::WriteFailed).into();
        assert_eq!(err, ParameterError::Io(PlatformError::File(FileError::WriteFailed)));
        assert_eq!(
            err.to_string(),
            "parameter file I/O: File error: WriteFailed"
        );
        assert_eq!(
            ParameterError::TruncatedRecord.to_string(),
            "truncated parameter record"
        );
    }
}
