use alloc::string::String;
use alloc::sync::Arc;

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};

use crate::heap::ObjRef;
use crate::registry::TypeKey;
use crate::value::{EnumValue, Value, Version};

/// Typed extraction from a [`Value`].
///
/// Returns `None` when the value holds a different variant. No numeric
/// conversion happens: an `i32` is not an `i64`.
///
/// # Examples
///
/// ```
/// use sg_reflect::{FromValue, Value};
///
/// assert_eq!(i32::from_value(&Value::I32(5)), Some(5));
/// assert_eq!(i64::from_value(&Value::I32(5)), None);
/// assert_eq!(Option::<i32>::from_value(&Value::Null), Some(None));
/// ```
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                #[inline]
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_value!(
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
    TypeKey => Type,
    ObjRef => Ref,
);

impl FromValue for String {
    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(String::from)
    }
}

impl FromValue for Value {
    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}
