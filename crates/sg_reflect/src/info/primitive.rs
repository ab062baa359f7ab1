use core::fmt;

use crate::value::Value;

// -----------------------------------------------------------------------------
// PrimitiveKind

/// Fixed-width scalar kinds, stored inline rather than by reference.
///
/// The discriminant doubles as the wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PrimitiveKind {
    Bool = 0,
    Char = 1,
    I8 = 2,
    U8 = 3,
    I16 = 4,
    U16 = 5,
    I32 = 6,
    U32 = 7,
    I64 = 8,
    U64 = 9,
    F32 = 10,
    F64 = 11,
}

impl PrimitiveKind {
    /// Every kind, in tag order.
    pub const ALL: [PrimitiveKind; 12] = [
        Self::Bool,
        Self::Char,
        Self::I8,
        Self::U8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::I64,
        Self::U64,
        Self::F32,
        Self::F64,
    ];

    /// The registered type path of this primitive.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        if (tag as usize) < Self::ALL.len() {
            Some(Self::ALL[tag as usize])
        } else {
            None
        }
    }

    /// Encoded width in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::Char | Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    /// The zero value of this kind.
    pub const fn default_value(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Char => Value::Char('\0'),
            Self::I8 => Value::I8(0),
            Self::U8 => Value::U8(0),
            Self::I16 => Value::I16(0),
            Self::U16 => Value::U16(0),
            Self::I32 => Value::I32(0),
            Self::U32 => Value::U32(0),
            Self::I64 => Value::I64(0),
            Self::U64 => Value::U64(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
        }
    }

    /// Narrows an integer to this kind, wrapping like an `as` cast.
    ///
    /// Returns `None` for `Bool`, `Char` and the float kinds.
    pub fn from_i64(self, value: i64) -> Option<Value> {
        Some(match self {
            Self::I8 => Value::I8(value as i8),
            Self::U8 => Value::U8(value as u8),
            Self::I16 => Value::I16(value as i16),
            Self::U16 => Value::U16(value as u16),
            Self::I32 => Value::I32(value as i32),
            Self::U32 => Value::U32(value as u32),
            Self::I64 => Value::I64(value),
            Self::U64 => Value::U64(value as u64),
            _ => return None,
        })
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::PrimitiveKind;
    use crate::value::Value;

    #[test]
    fn tags_round_trip() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_tag(12), None);
    }

    #[test]
    fn narrowing_wraps() {
        assert_eq!(PrimitiveKind::U8.from_i64(257), Some(Value::U8(1)));
        assert_eq!(PrimitiveKind::I16.from_i64(-2), Some(Value::I16(-2)));
        assert_eq!(PrimitiveKind::F32.from_i64(1), None);
    }
}
