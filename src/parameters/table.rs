//! Parameter table: descriptors plus their live values
//!
//! The table owns one value cell per descriptor. Cells always hold a valid
//! value: defaults at construction, parsed values afterwards.

use super::descriptor::{from_fixed_point, ParamDescriptor, ParamType};
use super::error::{ParameterError, Result};
use super::value::{ParamString, ParamValue};
use alloc::vec::Vec;

/// Find the first descriptor named `name` (case-insensitive)
pub fn lookup(descriptors: &[ParamDescriptor], name: &str) -> Option<usize> {
    descriptors.iter().position(|d| d.matches(name))
}

/// Parse value text for `descriptor`
///
/// Numerics accept `0x`-prefixed hex or decimal with an optional leading `-`.
/// The text is the raw 64-bit pattern (fixed-point scaled for Float/Double)
/// and must lie within the descriptor bounds. Hex is a bit pattern: for the
/// narrow signed types both the sign-extended form and the bare 8/16/32-bit
/// form are accepted. A leading `-` is only valid for signed types, so `-1`
/// never wraps into an unsigned maximum. Null always parses to null and
/// String to an owned copy of the bytes. NUL is the field terminator of the
/// parameter file, so a string containing one is rejected.
pub fn parse_value(descriptor: &ParamDescriptor, text: &[u8]) -> Result<ParamValue> {
    let ty = descriptor.param_type;
    match ty {
        ParamType::Null => return Ok(ParamValue::Null),
        ParamType::String if text.contains(&0) => return Err(ParameterError::InvalidValue),
        ParamType::String => return Ok(ParamValue::String(ParamString::Owned(text.to_vec()))),
        _ => {}
    }

    let text = core::str::from_utf8(text).map_err(|_| ParameterError::InvalidValue)?;
    let raw = parse_raw(ty, text).ok_or(ParameterError::InvalidValue)?;
    if !descriptor.in_range(raw) {
        return Err(ParameterError::InvalidValue);
    }
    let value = match ty {
        ParamType::Float => ParamValue::Float(from_fixed_point(raw) as f32),
        ParamType::Double => ParamValue::Double(from_fixed_point(raw)),
        _ => ParamValue::from_raw(ty, raw),
    };
    Ok(value)
}

/// Parse `0x` hex or signed decimal into a raw 64-bit pattern of `ty`
fn parse_raw(ty: ParamType, text: &str) -> Option<u64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        return ty.sign_extend(u64::from_str_radix(hex, 16).ok()?);
    }
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude: u64 = digits.parse().ok()?;
    if negative {
        if !ty.is_signed() || magnitude > 1u64 << 63 {
            return None;
        }
        Some(magnitude.wrapping_neg())
    } else {
        Some(magnitude)
    }
}

/// Descriptors plus live values
#[derive(Debug, Clone)]
pub struct ParameterTable {
    descriptors: &'static [ParamDescriptor],
    values: Vec<ParamValue>,
    found: Vec<bool>,
}

impl ParameterTable {
    /// Build a table with every cell at its default
    ///
    /// # Panics
    ///
    /// Panics on a malformed descriptor table: duplicate names, bounds outside
    /// the type width, `minimum > maximum`, a default outside the bounds or a
    /// default of the wrong kind.
    pub fn new(descriptors: &'static [ParamDescriptor]) -> Self {
        for (i, d) in descriptors.iter().enumerate() {
            if let Some(problem) = d.check() {
                panic!("malformed parameter table: {}: {}", d.name, problem);
            }
            if lookup(&descriptors[..i], d.name).is_some() {
                panic!("malformed parameter table: {}: duplicate name", d.name);
            }
        }

        Self {
            descriptors,
            values: descriptors.iter().map(ParamValue::default_for).collect(),
            found: alloc::vec![false; descriptors.len()],
        }
    }

    /// Reset every cell to its default and forget which were loaded
    pub fn apply_defaults(&mut self) {
        for (cell, d) in self.values.iter_mut().zip(self.descriptors) {
            *cell = ParamValue::default_for(d);
        }
        self.found.iter_mut().for_each(|f| *f = false);
    }

    pub fn descriptors(&self) -> &'static [ParamDescriptor] {
        self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptor/value pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (&'static ParamDescriptor, &ParamValue)> {
        self.descriptors.iter().zip(self.values.iter())
    }

    /// Index of the descriptor named `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        lookup(self.descriptors, name)
    }

    /// Descriptor named `name`
    pub fn descriptor(&self, name: &str) -> Option<&'static ParamDescriptor> {
        let descriptors = self.descriptors;
        lookup(descriptors, name).map(|i| &descriptors[i])
    }

    /// Value at `index`
    pub fn value(&self, index: usize) -> Option<&ParamValue> {
        self.values.get(index)
    }

    /// Value of the parameter named `name`
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.index_of(name).map(|i| &self.values[i])
    }

    /// Store `value` in the cell at `index`, dropping the previous value
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or the value type does not match the
    /// descriptor. Both indicate a bug in the caller.
    pub fn set_value(&mut self, index: usize, value: ParamValue) {
        let d = &self.descriptors[index];
        if !value.fits(d.param_type) {
            panic!(
                "parameter {}: {} value stored in {} cell",
                d.name,
                value.param_type().name(),
                d.param_type.name()
            );
        }
        self.values[index] = value;
    }

    /// Whether the last file read supplied a record for `name`
    pub fn was_loaded(&self, name: &str) -> bool {
        self.index_of(name).map(|i| self.found[i]).unwrap_or(false)
    }

    pub(crate) fn mark_found(&mut self, index: usize) {
        self.found[index] = true;
    }

    pub(crate) fn clear_found(&mut self) {
        self.found.iter_mut().for_each(|f| *f = false);
    }

    pub(crate) fn is_found(&self, index: usize) -> bool {
        self.found[index]
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_u8(&self, name: &str) -> Option<u8> {
        match self.get(name)? {
            ParamValue::UInt8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_u16(&self, name: &str) -> Option<u16> {
        match self.get(name)? {
            ParamValue::UInt16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_u32(&self, name: &str) -> Option<u32> {
        match self.get(name)? {
            ParamValue::UInt32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_i32(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            ParamValue::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_f32(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// String bytes; `None` when the parameter is unknown or holds no string
    pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
        self.get(name)?.as_bytes()
    }

    /// String value as UTF-8; `None` when absent or not valid UTF-8
    pub fn get_str(&self, name: &str) -> Option<&str> {
        core::str::from_utf8(self.get_bytes(name)?).ok()
    }
}
