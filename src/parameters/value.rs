//! Live parameter values

use super::descriptor::{from_fixed_point, to_fixed_point, DefaultValue, ParamDescriptor, ParamType};
use alloc::vec::Vec;

/// String cell contents
///
/// Defaults borrow `'static` literals; values parsed from the file or set at
/// runtime own their bytes. Bytes are arbitrary apart from NUL. Equality
/// compares the bytes, not where they live.
#[derive(Debug, Clone)]
pub enum ParamString {
    Static(&'static [u8]),
    Owned(Vec<u8>),
}

impl PartialEq for ParamString {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for ParamString {}

impl ParamString {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ParamString::Static(bytes) => bytes,
            ParamString::Owned(bytes) => bytes,
        }
    }

    /// UTF-8 view, if the bytes are valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.as_bytes()).ok()
    }
}

/// Value held in a parameter cell
///
/// A `String` parameter that holds no string is `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(ParamString),
}

impl ParamValue {
    /// Type of this value
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::Null => ParamType::Null,
            ParamValue::Bool(_) => ParamType::Bool,
            ParamValue::Int8(_) => ParamType::Int8,
            ParamValue::Int16(_) => ParamType::Int16,
            ParamValue::Int32(_) => ParamType::Int32,
            ParamValue::Int64(_) => ParamType::Int64,
            ParamValue::UInt8(_) => ParamType::UInt8,
            ParamValue::UInt16(_) => ParamType::UInt16,
            ParamValue::UInt32(_) => ParamType::UInt32,
            ParamValue::UInt64(_) => ParamType::UInt64,
            ParamValue::Float(_) => ParamType::Float,
            ParamValue::Double(_) => ParamType::Double,
            ParamValue::String(_) => ParamType::String,
        }
    }

    /// Build a numeric value from its raw pattern
    ///
    /// Narrow types take the low bits; `Null` and `String` yield `Null`.
    pub fn from_raw(param_type: ParamType, raw: u64) -> Self {
        match param_type {
            ParamType::Null | ParamType::String => ParamValue::Null,
            ParamType::Bool => ParamValue::Bool(raw != 0),
            ParamType::Int8 => ParamValue::Int8(raw as i8),
            ParamType::Int16 => ParamValue::Int16(raw as i16),
            ParamType::Int32 => ParamValue::Int32(raw as i32),
            ParamType::Int64 => ParamValue::Int64(raw as i64),
            ParamType::UInt8 => ParamValue::UInt8(raw as u8),
            ParamType::UInt16 => ParamValue::UInt16(raw as u16),
            ParamType::UInt32 => ParamValue::UInt32(raw as u32),
            ParamType::UInt64 => ParamValue::UInt64(raw),
            ParamType::Float => ParamValue::Float(from_fixed_point(raw) as f32),
            ParamType::Double => ParamValue::Double(from_fixed_point(raw)),
        }
    }

    /// Raw 64-bit pattern of a numeric value (`None` for Null / String)
    pub fn raw_bits(&self) -> Option<u64> {
        let raw = match self {
            ParamValue::Null | ParamValue::String(_) => return None,
            ParamValue::Bool(v) => *v as u64,
            ParamValue::Int8(v) => *v as i64 as u64,
            ParamValue::Int16(v) => *v as i64 as u64,
            ParamValue::Int32(v) => *v as i64 as u64,
            ParamValue::Int64(v) => *v as u64,
            ParamValue::UInt8(v) => *v as u64,
            ParamValue::UInt16(v) => *v as u64,
            ParamValue::UInt32(v) => *v as u64,
            ParamValue::UInt64(v) => *v,
            ParamValue::Float(v) => to_fixed_point(*v as f64),
            ParamValue::Double(v) => to_fixed_point(*v),
        };
        Some(raw)
    }

    /// Default value of a descriptor
    pub fn default_for(descriptor: &ParamDescriptor) -> Self {
        match descriptor.default {
            DefaultValue::Str(Some(text)) => {
                ParamValue::String(ParamString::Static(text.as_bytes()))
            }
            DefaultValue::Str(None) => ParamValue::Null,
            DefaultValue::Bits(raw) => Self::from_raw(descriptor.param_type, raw),
        }
    }

    /// All-zero value of a type: zero for numerics, null otherwise
    pub fn zero(param_type: ParamType) -> Self {
        Self::from_raw(param_type, 0)
    }

    /// Whether this value may be stored in a cell of `param_type`
    pub fn fits(&self, param_type: ParamType) -> bool {
        let own = self.param_type();
        own == param_type || (own == ParamType::Null && param_type == ParamType::String)
    }

    /// String bytes, if this is a string
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ParamValue::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }
}
