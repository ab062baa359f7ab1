use core::fmt;

use crate::info::PrimitiveKind;

// -----------------------------------------------------------------------------
// TypeKey

/// Dense identifier of a type inside one [`TypeRegistry`].
///
/// Keys of the built-in types are fixed, see the associated constants.
///
/// [`TypeRegistry`]: crate::registry::TypeRegistry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(u32);

impl TypeKey {
    pub const OBJECT: TypeKey = TypeKey(0);
    pub const BOOL: TypeKey = TypeKey(1);
    pub const CHAR: TypeKey = TypeKey(2);
    pub const I8: TypeKey = TypeKey(3);
    pub const U8: TypeKey = TypeKey(4);
    pub const I16: TypeKey = TypeKey(5);
    pub const U16: TypeKey = TypeKey(6);
    pub const I32: TypeKey = TypeKey(7);
    pub const U32: TypeKey = TypeKey(8);
    pub const I64: TypeKey = TypeKey(9);
    pub const U64: TypeKey = TypeKey(10);
    pub const F32: TypeKey = TypeKey(11);
    pub const F64: TypeKey = TypeKey(12);
    pub const STRING: TypeKey = TypeKey(13);
    pub const DATE_TIME: TypeKey = TypeKey(14);
    pub const DATE_TIME_OFFSET: TypeKey = TypeKey(15);
    pub const TIME_SPAN: TypeKey = TypeKey(16);
    pub const TIME_ZONE: TypeKey = TypeKey(17);
    pub const VERSION: TypeKey = TypeKey(18);
    pub const TYPE: TypeKey = TypeKey(19);
    pub const BYTES: TypeKey = TypeKey(20);

    /// Number of built-in types registered by `TypeRegistry::new`.
    pub(crate) const BUILTIN_COUNT: u32 = 21;

    #[inline]
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The built-in key of a primitive kind.
    pub const fn of_primitive(kind: PrimitiveKind) -> Self {
        Self(Self::BOOL.0 + kind as u32)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
