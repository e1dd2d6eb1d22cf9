//! Parameter store operations: load with self-healing, set and clear by name

use super::error::{ParameterError, Result};
use super::format::{read_file, write_file};
use super::table::{parse_value, ParameterTable};
use super::value::ParamValue;
use crate::platform::FileSystem;
use crate::core::display::reborrow;
use crate::{display, log_error, log_info, log_warn};
use core::fmt::Write;

/// Where the live values came from after `get_parameters`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "esp32", derive(defmt::Format))]
pub enum LoadSource {
    /// Parsed from the persisted file
    File,
    /// File was missing or corrupt; defaults were written back and reloaded
    RewrittenDefaults,
    /// Storage unavailable; defaults only, nothing persisted
    Defaults,
}

/// Load `table` from `path`, healing a missing or corrupt file
///
/// Defaults are applied first. On a read failure the defaults are re-applied,
/// written back and read again. On any outcome, including `Err`, every cell
/// holds a valid value.
pub fn get_parameters<F: FileSystem>(
    fs: &mut F,
    path: &str,
    table: &mut ParameterTable,
    mut display: Option<&mut dyn Write>,
) -> Result<LoadSource> {
    table.apply_defaults();

    if !fs.is_available() {
        log_warn!("params: storage unavailable, using defaults");
        display!(display, "Parameter storage unavailable, using defaults");
        return Ok(LoadSource::Defaults);
    }

    if read_file(fs, path, table, reborrow(&mut display)).is_ok() {
        log_info!("params: loaded {}", path);
        return Ok(LoadSource::File);
    }

    log_warn!("params: rewriting {} with defaults", path);
    display!(display, "Rewriting {} with default values", path);
    table.apply_defaults();
    let healed = write_file(fs, path, table, reborrow(&mut display))
        .and_then(|_| read_file(fs, path, table, reborrow(&mut display)));
    match healed {
        Ok(()) => Ok(LoadSource::RewrittenDefaults),
        Err(e) => {
            log_error!("params: {} unusable: {}", path, e);
            display!(display, "Parameter file {} unusable: {}", path, e);
            table.apply_defaults();
            Err(e)
        }
    }
}

/// Parse `text` into the parameter `name` and rewrite the file
///
/// A parse failure leaves both the value and the file untouched.
pub fn set_parameter<F: FileSystem>(
    fs: &mut F,
    path: &str,
    table: &mut ParameterTable,
    name: &str,
    text: &[u8],
    mut display: Option<&mut dyn Write>,
) -> Result<()> {
    let Some(index) = table.index_of(name) else {
        log_warn!("params: set of unknown parameter {}", name);
        display!(display, "{}: unknown parameter", name);
        return Err(ParameterError::UnknownParameter);
    };
    let d = table.descriptors()[index];
    let value = parse_value(&d, text).inspect_err(|_| {
        log_warn!("params: rejected value for {}", d.name);
        display!(display, "{}: invalid value", d.name);
    })?;
    table.set_value(index, value);
    log_info!("params: {} updated", d.name);
    write_file(fs, path, table, display)
}

/// Reset the parameter `name` to all-zero (null for strings) and rewrite
pub fn clear_parameter<F: FileSystem>(
    fs: &mut F,
    path: &str,
    table: &mut ParameterTable,
    name: &str,
    mut display: Option<&mut dyn Write>,
) -> Result<()> {
    let Some(index) = table.index_of(name) else {
        log_warn!("params: clear of unknown parameter {}", name);
        display!(display, "{}: unknown parameter", name);
        return Err(ParameterError::UnknownParameter);
    };
    let d = table.descriptors()[index];
    table.set_value(index, ParamValue::zero(d.param_type));
    log_info!("params: {} cleared", d.name);
    write_file(fs, path, table, display)
}
