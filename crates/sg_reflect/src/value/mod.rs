//! Provide [`Value`], the inline representation of everything a member can hold.
//!
//! Reference objects live in a [`Heap`](crate::heap::Heap) and are held
//! through [`Value::Ref`]. Everything else is stored by value.

// -----------------------------------------------------------------------------
// Modules

mod from_value;
mod version;

// -----------------------------------------------------------------------------
// Exports

pub use from_value::FromValue;
pub use version::{ParseVersionError, Version};

// -----------------------------------------------------------------------------
// Value

use alloc::string::String;
use alloc::sync::Arc;
use core::hash::{Hash, Hasher};
use core::mem;

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};

use crate::heap::ObjRef;
use crate::info::PrimitiveKind;
use crate::registry::TypeKey;

/// A constant of a registered enum type.
///
/// The value is kept as `i64` and narrowed through the enum's
/// underlying primitive when written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub ty: TypeKey,
    pub value: i64,
}

/// A dynamically typed value.
///
/// Equality and hashing are structural, except for [`Value::Ref`] which
/// compares handles, i.e. object identity. Floats compare by bit pattern
/// so that `Value` can key a map.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(Arc<str>),
    Enum(EnumValue),
    DateTime(DateTime<Utc>),
    DateTimeOffset(DateTime<FixedOffset>),
    TimeSpan(TimeDelta),
    /// A time zone, stored by identifier.
    TimeZone(Arc<str>),
    Version(Version),
    /// A runtime type descriptor.
    Type(TypeKey),
    Ref(ObjRef),
}

impl Value {
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The primitive kind of this value, if it is a primitive.
    pub const fn primitive_kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::Char(_) => PrimitiveKind::Char,
            Self::I8(_) => PrimitiveKind::I8,
            Self::U8(_) => PrimitiveKind::U8,
            Self::I16(_) => PrimitiveKind::I16,
            Self::U16(_) => PrimitiveKind::U16,
            Self::I32(_) => PrimitiveKind::I32,
            Self::U32(_) => PrimitiveKind::U32,
            Self::I64(_) => PrimitiveKind::I64,
            Self::U64(_) => PrimitiveKind::U64,
            Self::F32(_) => PrimitiveKind::F32,
            Self::F64(_) => PrimitiveKind::F64,
            _ => return None,
        })
    }

    /// The runtime type of an inline value.
    ///
    /// Returns `None` for `Null` and for `Ref`, whose type is stored in the heap.
    pub const fn inline_type(&self) -> Option<TypeKey> {
        if let Some(kind) = self.primitive_kind() {
            return Some(TypeKey::of_primitive(kind));
        }
        Some(match self {
            Self::String(_) => TypeKey::STRING,
            Self::Enum(e) => e.ty,
            Self::DateTime(_) => TypeKey::DATE_TIME,
            Self::DateTimeOffset(_) => TypeKey::DATE_TIME_OFFSET,
            Self::TimeSpan(_) => TypeKey::TIME_SPAN,
            Self::TimeZone(_) => TypeKey::TIME_ZONE,
            Self::Version(_) => TypeKey::VERSION,
            Self::Type(_) => TypeKey::TYPE,
            _ => return None,
        })
    }

    #[inline]
    pub const fn as_obj(&self) -> Option<ObjRef> {
        match self {
            Self::Ref(obj) => Some(*obj),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Widens an integer primitive or enum constant to `i64`.
    pub const fn as_i64(&self) -> Option<i64> {
        Some(match *self {
            Self::I8(v) => v as i64,
            Self::U8(v) => v as i64,
            Self::I16(v) => v as i64,
            Self::U16(v) => v as i64,
            Self::I32(v) => v as i64,
            Self::U32(v) => v as i64,
            Self::I64(v) => v,
            Self::U64(v) => v as i64,
            Self::Enum(e) => e.value,
            _ => return None,
        })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Char(a), Char(b)) => a == b,
            (I8(a), I8(b)) => a == b,
            (U8(a), U8(b)) => a == b,
            (I16(a), I16(b)) => a == b,
            (U16(a), U16(b)) => a == b,
            (I32(a), I32(b)) => a == b,
            (U32(a), U32(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (U64(a), U64(b)) => a == b,
            (F32(a), F32(b)) => a.to_bits() == b.to_bits(),
            (F64(a), F64(b)) => a.to_bits() == b.to_bits(),
            (String(a), String(b)) | (TimeZone(a), TimeZone(b)) => a == b,
            (Enum(a), Enum(b)) => a == b,
            (DateTime(a), DateTime(b)) => a == b,
            // Same instant is not enough, the offset is part of the value.
            (DateTimeOffset(a), DateTimeOffset(b)) => a == b && a.offset() == b.offset(),
            (TimeSpan(a), TimeSpan(b)) => a == b,
            (Version(a), Version(b)) => a == b,
            (Type(a), Type(b)) => a == b,
            (Ref(a), Ref(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(v) => v.hash(state),
            Self::Char(v) => v.hash(state),
            Self::I8(v) => v.hash(state),
            Self::U8(v) => v.hash(state),
            Self::I16(v) => v.hash(state),
            Self::U16(v) => v.hash(state),
            Self::I32(v) => v.hash(state),
            Self::U32(v) => v.hash(state),
            Self::I64(v) => v.hash(state),
            Self::U64(v) => v.hash(state),
            Self::F32(v) => v.to_bits().hash(state),
            Self::F64(v) => v.to_bits().hash(state),
            Self::String(v) | Self::TimeZone(v) => v.hash(state),
            Self::Enum(v) => v.hash(state),
            Self::DateTime(v) => v.hash(state),
            Self::DateTimeOffset(v) => {
                v.hash(state);
                v.offset().local_minus_utc().hash(state);
            }
            Self::TimeSpan(v) => v.hash(state),
            Self::Version(v) => v.hash(state),
            Self::Type(v) => v.hash(state),
            Self::Ref(v) => v.hash(state),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from!(
    bool => Bool,
    char => Char,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Arc<str> => String,
    EnumValue => Enum,
    DateTime<Utc> => DateTime,
    DateTime<FixedOffset> => DateTimeOffset,
    TimeDelta => TimeSpan,
    Version => Version,
    ObjRef => Ref,
);

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Self::String(value.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
