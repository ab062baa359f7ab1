use alloc::vec::Vec;

use sg_utils::collections::{OrderedMap, OrderedSet};

use crate::registry::TypeKey;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Handles

/// Handle of an object inside a [`Heap`](crate::heap::Heap).
///
/// Handles compare by identity: two handles are equal only if they
/// designate the same allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjRef(u32);

impl ObjRef {
    #[inline]
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for ObjRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// A not yet materialized reference: the object `index` of the
/// type table entry `type_index` of the load session `session`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub session: u32,
    pub type_index: u16,
    pub index: u32,
}

/// The state of one member of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Loaded(Value),
    /// A lazy member whose value has not been read yet.
    ///
    /// `None` marks a member whose stored bytes were not loadable;
    /// it stays at its default forever.
    Unloaded(Option<TypeRef>),
}

impl Default for Slot {
    #[inline]
    fn default() -> Self {
        Self::Loaded(Value::Null)
    }
}

impl Slot {
    #[inline]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

// -----------------------------------------------------------------------------
// Object

/// The payload of a heap object, one variant per container shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectData {
    /// Member slots, in the flattened member order of the type.
    Fields(Vec<Slot>),
    Array(Vec<Value>),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(OrderedMap<Value, Value>),
    Set(OrderedSet<Value>),
}

impl ObjectData {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Fields(_) => "object",
            Self::Array(_) => "array",
            Self::Bytes(_) => "byte array",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Set(_) => "set",
        }
    }
}

/// An object allocated in a [`Heap`](crate::heap::Heap).
#[derive(Debug, Clone)]
pub struct Object {
    ty: TypeKey,
    data: ObjectData,
}

impl Object {
    #[inline]
    pub const fn new(ty: TypeKey, data: ObjectData) -> Self {
        Self { ty, data }
    }

    /// The runtime type of this object.
    #[inline]
    pub const fn ty(&self) -> TypeKey {
        self.ty
    }

    #[inline]
    pub const fn data(&self) -> &ObjectData {
        &self.data
    }

    #[inline]
    pub const fn data_mut(&mut self) -> &mut ObjectData {
        &mut self.data
    }
}
