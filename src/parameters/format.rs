//! Parameter file format
//!
//! The file is a sequence of records, each three NUL-terminated fields:
//!
//! ```text
//! name\0 type\0 value\0 name\0 type\0 value\0 ...
//! ```
//!
//! - `type` is the type ordinal in ASCII decimal
//! - numeric values are `0x` + 16 lowercase hex digits of the raw 64-bit
//!   pattern (Float / Double pre-scaled by 2^28)
//! - strings are written raw; a string cell holding no string is written as
//!   `nullptr` with type Null
//!
//! The file is always read whole and rewritten whole.

use super::descriptor::ParamType;
use super::error::{ParameterError, Result};
use super::table::{lookup, parse_value, ParameterTable};
use super::value::ParamValue;
use crate::platform::{File, FileError, FileSystem, OpenMode, PlatformError};
use crate::core::display::reborrow;
use crate::{display, log_debug, log_error, log_info, log_warn};
use alloc::vec::Vec;
use core::fmt::Write;

/// Value text written for a cell that holds no string
pub const NULL_SENTINEL: &[u8] = b"nullptr";

/// Read `path` into `table`
///
/// Unknown names are skipped with a warning. A known name whose type or value
/// does not parse fails the whole read; values applied before the failure
/// stay applied. Required parameters without a record are reported only.
pub fn read_file<F: FileSystem>(
    fs: &mut F,
    path: &str,
    table: &mut ParameterTable,
    mut display: Option<&mut dyn Write>,
) -> Result<()> {
    if !fs.is_available() {
        log_warn!("params: storage unavailable, cannot read {}", path);
        return Err(ParameterError::StorageUnavailable);
    }
    if !fs.exists(path) {
        log_warn!("params: {} not found", path);
        display!(display, "Parameter file {} not found", path);
        return Err(ParameterError::FileMissing);
    }

    let data = load(fs, path).inspect_err(|e| {
        log_error!("params: reading {} failed: {}", path, e);
    })?;
    if data.is_empty() {
        log_warn!("params: {} is empty", path);
        display!(display, "Parameter file {} is empty", path);
        return Err(ParameterError::EmptyFile);
    }

    table.clear_found();
    let mut pos = 0;
    while pos < data.len() {
        let (Some(name), Some(ty), Some(value)) = (
            next_field(&data, &mut pos),
            next_field(&data, &mut pos),
            next_field(&data, &mut pos),
        ) else {
            log_error!("params: truncated record at end of {}", path);
            display!(display, "Parameter file {}: truncated record", path);
            return Err(ParameterError::TruncatedRecord);
        };
        apply_record(table, name, ty, value, reborrow(&mut display))?;
    }

    for (i, d) in table.descriptors().iter().enumerate() {
        if d.required && !table.is_found(i) {
            log_info!("params: {} missing from file, using default", d.name);
            display!(display, "{}: not in file, using default", d.name);
        }
    }
    Ok(())
}

/// Rewrite `path` from the live values of `table`
///
/// Not atomic: a failed write leaves the bytes already written in place.
pub fn write_file<F: FileSystem>(
    fs: &mut F,
    path: &str,
    table: &ParameterTable,
    mut display: Option<&mut dyn Write>,
) -> Result<()> {
    if !fs.is_available() {
        log_warn!("params: storage unavailable, {} not written", path);
        display!(display, "Parameter storage unavailable, {} not written", path);
        return Err(ParameterError::StorageUnavailable);
    }
    let mut file = fs.open(path, OpenMode::WriteTruncate).inspect_err(|e| {
        log_error!("params: cannot open {} for writing: {}", path, e);
    })?;

    for (d, value) in table.iter() {
        if let Err(e) = write_record(&mut file, d.name, value) {
            log_error!("params: writing {} to {} failed: {}", d.name, path, e);
            display!(display, "Parameter file {}: write of {} failed", path, d.name);
            return Err(e);
        }
    }
    file.close()?;
    log_debug!("params: wrote {} parameters to {}", table.len(), path);
    Ok(())
}

fn load<F: FileSystem>(fs: &mut F, path: &str) -> Result<Vec<u8>> {
    let mut file = fs.open(path, OpenMode::Read)?;
    let size = file.size();
    let mut data = alloc::vec![0u8; size];
    let mut filled = 0;
    while filled < size {
        let count = file.read(&mut data[filled..])?;
        if count == 0 {
            break;
        }
        filled += count;
    }
    data.truncate(filled);
    file.close()?;
    Ok(data)
}

/// Next NUL-terminated field starting at `pos`; `None` if unterminated
fn next_field<'a>(data: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    let rest = data.get(*pos..)?;
    let end = rest.iter().position(|b| *b == 0)?;
    *pos += end + 1;
    Some(&rest[..end])
}

fn apply_record(
    table: &mut ParameterTable,
    name: &[u8],
    ty: &[u8],
    value: &[u8],
    mut display: Option<&mut dyn Write>,
) -> Result<()> {
    let index = match core::str::from_utf8(name)
        .ok()
        .and_then(|name| lookup(table.descriptors(), name))
    {
        Some(index) => index,
        None => {
            let shown = core::str::from_utf8(name).unwrap_or("<non-utf8>");
            log_warn!("params: skipping unknown parameter {}", shown);
            display!(display, "{}: unknown parameter, skipped", shown);
            return Ok(());
        }
    };
    let d = table.descriptors()[index];

    let record_type = parse_ordinal(ty).ok_or_else(|| {
        log_error!("params: {} has bad type field", d.name);
        display!(display, "{}: bad type field", d.name);
        ParameterError::TypeMismatch
    })?;

    let parsed = if record_type == d.param_type {
        parse_value(&d, value)
    } else if record_type == ParamType::Null && d.param_type == ParamType::String {
        Ok(ParamValue::Null)
    } else {
        log_error!(
            "params: {} stored as {}, expected {}",
            d.name,
            record_type.name(),
            d.param_type.name()
        );
        display!(
            display,
            "{}: stored as {}, expected {}",
            d.name,
            record_type.name(),
            d.param_type.name()
        );
        return Err(ParameterError::TypeMismatch);
    };

    match parsed {
        Ok(v) => {
            table.set_value(index, v);
            table.mark_found(index);
            Ok(())
        }
        Err(e) => {
            log_error!("params: {} has invalid value", d.name);
            display!(display, "{}: invalid value", d.name);
            Err(e)
        }
    }
}

fn parse_ordinal(text: &[u8]) -> Option<ParamType> {
    if text.is_empty() || !text.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let ordinal: u64 = core::str::from_utf8(text).ok()?.parse().ok()?;
    ParamType::from_ordinal(ordinal)
}

fn write_record<W: File>(file: &mut W, name: &str, value: &ParamValue) -> Result<()> {
    let mut number: heapless::String<18> = heapless::String::new();
    let (ty, text): (ParamType, &[u8]) = match value {
        ParamValue::Null => (ParamType::Null, NULL_SENTINEL),
        ParamValue::String(s) => (ParamType::String, s.as_bytes()),
        numeric => {
            let fitted = write!(number, "0x{:016x}", numeric.raw_bits().unwrap_or(0));
            debug_assert!(fitted.is_ok(), "hex value overflows its buffer");
            (numeric.param_type(), number.as_bytes())
        }
    };
    let mut ordinal: heapless::String<3> = heapless::String::new();
    let fitted = write!(ordinal, "{}", ty.ordinal());
    debug_assert!(fitted.is_ok(), "type ordinal overflows its buffer");

    write_field(file, name.as_bytes())?;
    write_field(file, ordinal.as_bytes())?;
    write_field(file, text)
}

fn write_field<W: File>(file: &mut W, bytes: &[u8]) -> Result<()> {
    for chunk in [bytes, &[0u8][..]] {
        if file.write(chunk)? != chunk.len() {
            return Err(PlatformError::from(FileError::WriteFailed).into());
        }
    }
    Ok(())
}
