use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::info::PrimitiveKind;
use crate::value::Value;

// -----------------------------------------------------------------------------
// EnumInfo

/// Named integer constants over an underlying integer primitive.
///
/// # Examples
///
/// ```
/// use sg_reflect::info::{EnumInfo, PrimitiveKind};
///
/// let info = EnumInfo::new(PrimitiveKind::U8)
///     .with_variant("Red", 1)
///     .with_variant("Green", 2);
///
/// assert_eq!(info.variant_name(2), Some("Green"));
/// assert_eq!(info.value_of("Red"), Some(1));
/// ```
#[derive(Clone, Debug)]
pub struct EnumInfo {
    underlying: PrimitiveKind,
    variants: Vec<(Arc<str>, i64)>,
}

impl Default for EnumInfo {
    fn default() -> Self {
        Self::new(PrimitiveKind::I32)
    }
}

impl EnumInfo {
    #[inline]
    pub const fn new(underlying: PrimitiveKind) -> Self {
        Self {
            underlying,
            variants: Vec::new(),
        }
    }

    #[inline]
    pub fn with_variant(mut self, name: impl Into<Arc<str>>, value: i64) -> Self {
        self.variants.push((name.into(), value));
        self
    }

    #[inline]
    pub fn underlying(&self) -> PrimitiveKind {
        self.underlying
    }

    pub fn variants(&self) -> impl ExactSizeIterator<Item = (&str, i64)> {
        self.variants.iter().map(|(name, value)| (&**name, *value))
    }

    pub fn variant_name(&self, value: i64) -> Option<&str> {
        self.variants
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, _)| &**name)
    }

    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.variants
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, value)| *value)
    }

    /// Narrows a stored value through the underlying primitive.
    pub fn narrow(&self, value: i64) -> i64 {
        match self.underlying.from_i64(value) {
            Some(Value::I8(v)) => v as i64,
            Some(Value::U8(v)) => v as i64,
            Some(Value::I16(v)) => v as i64,
            Some(Value::U16(v)) => v as i64,
            Some(Value::I32(v)) => v as i64,
            Some(Value::U32(v)) => v as i64,
            Some(Value::U64(v)) => v as i64,
            _ => value,
        }
    }
}
