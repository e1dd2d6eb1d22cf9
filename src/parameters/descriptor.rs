//! Parameter descriptors
//!
//! A descriptor is the immutable metadata row for one parameter: name, type,
//! bounds, default and whether the persisted file is expected to carry it.
//! Tables of descriptors are `static` and built with the `const` constructors
//! below.
//!
//! # Raw Representation
//!
//! Bounds and numeric defaults are held as 64-bit raw patterns:
//! - signed integers sign-extended (`-1i8` is `0xffff_ffff_ffff_ffff`)
//! - unsigned integers and `Bool` zero-extended
//! - `Float` / `Double` as a signed fixed-point integer scaled by 2^28

use core::cmp::Ordering;

/// Fixed-point scale applied to `Float` / `Double` values on disk and in bounds
pub const FIXED_POINT_SCALE: f64 = (1u64 << 28) as f64;

/// Parameter type
///
/// The discriminant is the type ordinal written to the parameter file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "esp32", derive(defmt::Format))]
#[repr(u8)]
pub enum ParamType {
    Null = 0,
    Bool = 1,
    Int8 = 2,
    Int16 = 3,
    Int32 = 4,
    Int64 = 5,
    UInt8 = 6,
    UInt16 = 7,
    UInt32 = 8,
    UInt64 = 9,
    Float = 10,
    Double = 11,
    String = 12,
}

impl ParamType {
    /// Every type, in ordinal order
    pub const ALL: [ParamType; 13] = [
        ParamType::Null,
        ParamType::Bool,
        ParamType::Int8,
        ParamType::Int16,
        ParamType::Int32,
        ParamType::Int64,
        ParamType::UInt8,
        ParamType::UInt16,
        ParamType::UInt32,
        ParamType::UInt64,
        ParamType::Float,
        ParamType::Double,
        ParamType::String,
    ];

    /// Ordinal written to the parameter file
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Type for a file ordinal
    pub fn from_ordinal(ordinal: u64) -> Option<Self> {
        Self::ALL.get(usize::try_from(ordinal).ok()?).copied()
    }

    /// Bounded numeric types (everything except `Null` and `String`)
    pub const fn is_numeric(self) -> bool {
        !matches!(self, ParamType::Null | ParamType::String)
    }

    /// Raw patterns compare as signed 64-bit integers
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            ParamType::Int8
                | ParamType::Int16
                | ParamType::Int32
                | ParamType::Int64
                | ParamType::Float
                | ParamType::Double
        )
    }

    /// Order two raw patterns of this type
    pub fn compare(self, a: u64, b: u64) -> Ordering {
        if self.is_signed() {
            (a as i64).cmp(&(b as i64))
        } else {
            a.cmp(&b)
        }
    }

    /// Whether a raw pattern is representable in this type's width
    pub fn holds(self, raw: u64) -> bool {
        let signed = raw as i64;
        match self {
            ParamType::Bool => raw <= 1,
            ParamType::Int8 => i8::try_from(signed).is_ok(),
            ParamType::Int16 => i16::try_from(signed).is_ok(),
            ParamType::Int32 => i32::try_from(signed).is_ok(),
            ParamType::UInt8 => u8::try_from(raw).is_ok(),
            ParamType::UInt16 => u16::try_from(raw).is_ok(),
            ParamType::UInt32 => u32::try_from(raw).is_ok(),
            ParamType::Int64
            | ParamType::UInt64
            | ParamType::Float
            | ParamType::Double
            | ParamType::Null
            | ParamType::String => true,
        }
    }

    /// Widen a hex bit pattern to the 64-bit raw form
    ///
    /// Narrow signed types accept either the sign-extended pattern or just
    /// their own 8/16/32 bits with the upper bits clear. Anything else is
    /// returned unchanged for the range check to judge.
    pub fn sign_extend(self, bits: u64) -> Option<u64> {
        let width = match self {
            ParamType::Int8 => 8,
            ParamType::Int16 => 16,
            ParamType::Int32 => 32,
            _ => return Some(bits),
        };
        if bits >> width == 0 {
            let shift = 64 - width;
            Some((((bits << shift) as i64) >> shift) as u64)
        } else if self.holds(bits) {
            Some(bits)
        } else {
            None
        }
    }

    /// Short type name for diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            ParamType::Null => "null",
            ParamType::Bool => "bool",
            ParamType::Int8 => "int8",
            ParamType::Int16 => "int16",
            ParamType::Int32 => "int32",
            ParamType::Int64 => "int64",
            ParamType::UInt8 => "uint8",
            ParamType::UInt16 => "uint16",
            ParamType::UInt32 => "uint32",
            ParamType::UInt64 => "uint64",
            ParamType::Float => "float",
            ParamType::Double => "double",
            ParamType::String => "string",
        }
    }
}

/// Scale a real value into its fixed-point raw pattern, rounding to nearest
pub const fn to_fixed_point(value: f64) -> u64 {
    let scaled = value * FIXED_POINT_SCALE;
    let rounded = if scaled >= 0.0 {
        (scaled + 0.5) as i64
    } else {
        (scaled - 0.5) as i64
    };
    rounded as u64
}

/// Recover a real value from its fixed-point raw pattern
pub fn from_fixed_point(raw: u64) -> f64 {
    (raw as i64) as f64 / FIXED_POINT_SCALE
}

/// Default value of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    /// Raw 64-bit pattern, reinterpreted by the descriptor type
    Bits(u64),
    /// String literal; `None` leaves the cell without a string
    Str(Option<&'static str>),
}

/// Static metadata row for one parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDescriptor {
    /// Lookup key, matched case-insensitively
    pub name: &'static str,
    /// Value type
    pub param_type: ParamType,
    /// Report when the persisted file has no record for this parameter
    pub required: bool,
    /// Inclusive lower bound (raw pattern, ignored for Null / String)
    pub minimum: u64,
    /// Inclusive upper bound (raw pattern, ignored for Null / String)
    pub maximum: u64,
    /// Value applied before the file is read
    pub default: DefaultValue,
}

impl ParamDescriptor {
    const fn numeric(
        name: &'static str,
        param_type: ParamType,
        minimum: u64,
        maximum: u64,
        default: u64,
    ) -> Self {
        Self {
            name,
            param_type,
            required: false,
            minimum,
            maximum,
            default: DefaultValue::Bits(default),
        }
    }

    /// Mark the parameter as expected in the persisted file
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn null(name: &'static str) -> Self {
        Self::numeric(name, ParamType::Null, 0, 0, 0)
    }

    pub const fn boolean(name: &'static str, default: bool) -> Self {
        Self::numeric(name, ParamType::Bool, 0, 1, default as u64)
    }

    pub const fn int8(name: &'static str, min: i8, max: i8, default: i8) -> Self {
        Self::numeric(
            name,
            ParamType::Int8,
            min as i64 as u64,
            max as i64 as u64,
            default as i64 as u64,
        )
    }

    pub const fn int16(name: &'static str, min: i16, max: i16, default: i16) -> Self {
        Self::numeric(
            name,
            ParamType::Int16,
            min as i64 as u64,
            max as i64 as u64,
            default as i64 as u64,
        )
    }

    pub const fn int32(name: &'static str, min: i32, max: i32, default: i32) -> Self {
        Self::numeric(
            name,
            ParamType::Int32,
            min as i64 as u64,
            max as i64 as u64,
            default as i64 as u64,
        )
    }

    pub const fn int64(name: &'static str, min: i64, max: i64, default: i64) -> Self {
        Self::numeric(name, ParamType::Int64, min as u64, max as u64, default as u64)
    }

    pub const fn uint8(name: &'static str, min: u8, max: u8, default: u8) -> Self {
        Self::numeric(
            name,
            ParamType::UInt8,
            min as u64,
            max as u64,
            default as u64,
        )
    }

    pub const fn uint16(name: &'static str, min: u16, max: u16, default: u16) -> Self {
        Self::numeric(
            name,
            ParamType::UInt16,
            min as u64,
            max as u64,
            default as u64,
        )
    }

    pub const fn uint32(name: &'static str, min: u32, max: u32, default: u32) -> Self {
        Self::numeric(
            name,
            ParamType::UInt32,
            min as u64,
            max as u64,
            default as u64,
        )
    }

    pub const fn uint64(name: &'static str, min: u64, max: u64, default: u64) -> Self {
        Self::numeric(name, ParamType::UInt64, min, max, default)
    }

    pub const fn float(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self::numeric(
            name,
            ParamType::Float,
            to_fixed_point(min as f64),
            to_fixed_point(max as f64),
            to_fixed_point(default as f64),
        )
    }

    pub const fn double(name: &'static str, min: f64, max: f64, default: f64) -> Self {
        Self::numeric(
            name,
            ParamType::Double,
            to_fixed_point(min),
            to_fixed_point(max),
            to_fixed_point(default),
        )
    }

    pub const fn string(name: &'static str, default: Option<&'static str>) -> Self {
        Self {
            name,
            param_type: ParamType::String,
            required: false,
            minimum: 0,
            maximum: 0,
            default: DefaultValue::Str(default),
        }
    }

    /// Case-insensitive name match
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Whether a raw pattern lies within the inclusive bounds
    pub fn in_range(&self, raw: u64) -> bool {
        let ty = self.param_type;
        ty.compare(raw, self.minimum) != Ordering::Less
            && ty.compare(raw, self.maximum) != Ordering::Greater
    }

    /// Self-check of one row; returns the problem found, if any
    pub(crate) fn check(&self) -> Option<&'static str> {
        if self.name.is_empty() {
            return Some("empty name");
        }
        if self.name.as_bytes().contains(&0) {
            return Some("NUL in name");
        }
        match (self.param_type, self.default) {
            (ParamType::String, DefaultValue::Str(_)) => None,
            (ParamType::String, DefaultValue::Bits(_)) => Some("string with numeric default"),
            (_, DefaultValue::Str(_)) => Some("numeric with string default"),
            (ParamType::Null, DefaultValue::Bits(_)) => None,
            (ty, DefaultValue::Bits(default)) => {
                if !ty.holds(self.minimum) || !ty.holds(self.maximum) {
                    Some("bound outside type width")
                } else if ty.compare(self.minimum, self.maximum) == Ordering::Greater {
                    Some("minimum above maximum")
                } else if !self.in_range(default) {
                    Some("default outside bounds")
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals() {
        for (i, ty) in ParamType::ALL.iter().enumerate() {
            assert_eq!(ty.ordinal() as usize, i);
            assert_eq!(ParamType::from_ordinal(i as u64), Some(*ty));
        }
        assert_eq!(ParamType::from_ordinal(13), None);
        assert_eq!(ParamType::from_ordinal(u64::MAX), None);
    }

    #[test]
    fn test_signed_raw_patterns() {
        let d = ParamDescriptor::int8("t", -128, 127, -1);
        assert_eq!(d.minimum, 0xffff_ffff_ffff_ff80);
        assert_eq!(d.default, DefaultValue::Bits(u64::MAX));
        assert!(d.in_range(0));
        assert!(d.in_range(-128i64 as u64));
        assert!(!d.in_range(-129i64 as u64));
    }

    #[test]
    fn test_sign_extend_narrow_patterns() {
        assert_eq!(ParamType::Int8.sign_extend(0xff), Some(u64::MAX));
        assert_eq!(ParamType::Int8.sign_extend(0x7f), Some(0x7f));
        assert_eq!(ParamType::Int8.sign_extend(u64::MAX), Some(u64::MAX));
        assert_eq!(ParamType::Int8.sign_extend(0x1ff), None);
        assert_eq!(
            ParamType::Int16.sign_extend(0x8000),
            Some(i16::MIN as i64 as u64)
        );
        assert_eq!(ParamType::Int32.sign_extend(0xffff_fff9), Some(-7i64 as u64));
        assert_eq!(ParamType::UInt8.sign_extend(0xff), Some(0xff));
        assert_eq!(ParamType::Int64.sign_extend(0xff), Some(0xff));
    }

    #[test]
    fn test_unsigned_compare() {
        let d = ParamDescriptor::uint64("t", 0, u64::MAX, 0);
        assert!(d.in_range(u64::MAX));
        let d = ParamDescriptor::uint8("t", 1, 14, 1);
        assert!(!d.in_range(0));
        assert!(!d.in_range(15));
    }

    #[test]
    fn test_fixed_point() {
        assert_eq!(to_fixed_point(1.0), 1 << 28);
        assert_eq!(to_fixed_point(-0.5), (-(1i64 << 27)) as u64);
        assert_eq!(from_fixed_point(to_fixed_point(2.25)), 2.25);
        let d = ParamDescriptor::float("t", -10.0, 10.0, 1.5);
        assert!(d.in_range(to_fixed_point(-10.0)));
        assert!(!d.in_range(to_fixed_point(-10.0) - 1));
    }

    #[test]
    fn test_required_builder() {
        const D: ParamDescriptor = ParamDescriptor::string("NAME", Some("x")).required();
        assert!(D.required);
        assert!(D.matches("name"));
    }

    #[test]
    fn test_check_rejects_malformed_rows() {
        assert_eq!(ParamDescriptor::string("", None).check(), Some("empty name"));
        assert_eq!(
            ParamDescriptor::uint8("t", 10, 1, 5).check(),
            Some("minimum above maximum")
        );
        assert_eq!(
            ParamDescriptor::int32("t", 0, 10, 11).check(),
            Some("default outside bounds")
        );
        let mut wide = ParamDescriptor::uint8("t", 0, 255, 0);
        wide.maximum = 256;
        assert_eq!(wide.check(), Some("bound outside type width"));
        assert_eq!(ParamDescriptor::double("t", -1.0, 1.0, 0.0).check(), None);
    }
}
