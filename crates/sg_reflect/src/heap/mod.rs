//! Provide the [`Heap`], the arena holding every reference object of a graph.
//!
//! Objects refer to each other through [`ObjRef`] handles stored in
//! [`Value::Ref`], so cyclic graphs need no shared ownership.

// -----------------------------------------------------------------------------
// Modules

mod error;
mod object;

// -----------------------------------------------------------------------------
// Exports

pub use error::HeapError;
pub use object::{ObjRef, Object, ObjectData, Slot, TypeRef};

// -----------------------------------------------------------------------------
// Heap

use alloc::vec::Vec;

use sg_utils::collections::{OrderedMap, OrderedSet};

use crate::info::{MemberInfo, TypeShape};
use crate::registry::{TypeEntry, TypeKey, TypeRegistry};
use crate::value::Value;

/// An arena of objects addressed by [`ObjRef`].
///
/// Objects are never freed individually; a heap lives as long as the
/// graphs it holds.
///
/// # Examples
///
/// ```
/// use sg_reflect::info::{MemberInfo, ObjectInfo, TypeInfo};
/// use sg_reflect::{Heap, TypeRegistry, Value};
///
/// let mut registry = TypeRegistry::new();
/// let circular = registry
///     .register(TypeInfo::object(
///         "app::Circular",
///         ObjectInfo::new().with_member(MemberInfo::field("this", "app::Circular")),
///     ))
///     .unwrap();
///
/// let mut heap = Heap::new();
/// let a = heap.new_object(&registry, circular).unwrap();
/// heap.set_member(&registry, a, "this", Value::Ref(a)).unwrap();
///
/// assert_eq!(heap.member(&registry, a, "this"), Ok(Value::Ref(a)));
/// ```
#[derive(Debug, Default, Clone)]
pub struct Heap {
    objects: Vec<Object>,
}

type Result<T, E = HeapError> = core::result::Result<T, E>;

macro_rules! impl_data_accessors {
    ($($get:ident, $get_mut:ident: $variant:ident => $ty:ty;)*) => {
        $(
            #[doc = concat!("The payload of a `", stringify!($variant), "` object.")]
            pub fn $get(&self, obj: ObjRef) -> Result<&$ty> {
                match self.get(obj)?.data() {
                    ObjectData::$variant(data) => Ok(data),
                    other => Err(mismatch(stringify!($get), other)),
                }
            }

            pub fn $get_mut(&mut self, obj: ObjRef) -> Result<&mut $ty> {
                match self.get_mut(obj)?.data_mut() {
                    ObjectData::$variant(data) => Ok(data),
                    other => Err(mismatch(stringify!($get), other)),
                }
            }
        )*
    };
}

#[inline(never)]
fn mismatch(expected: &'static str, found: &ObjectData) -> HeapError {
    HeapError::ShapeMismatch {
        expected,
        found: found.name(),
    }
}

impl Heap {
    #[inline]
    pub const fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Allocates an object as is. No shape check is done.
    pub fn alloc(&mut self, ty: TypeKey, data: ObjectData) -> Result<ObjRef> {
        let index = u32::try_from(self.objects.len()).map_err(|_| HeapError::Overflow)?;
        self.objects.push(Object::new(ty, data));
        Ok(ObjRef::new(index))
    }

    #[inline]
    pub fn get(&self, obj: ObjRef) -> Result<&Object> {
        self.objects.get(obj.index()).ok_or(HeapError::InvalidRef(obj))
    }

    #[inline]
    pub fn get_mut(&mut self, obj: ObjRef) -> Result<&mut Object> {
        self.objects
            .get_mut(obj.index())
            .ok_or(HeapError::InvalidRef(obj))
    }

    /// The runtime type of `obj`.
    #[inline]
    pub fn type_of(&self, obj: ObjRef) -> Result<TypeKey> {
        self.get(obj).map(Object::ty)
    }

    /// Constructs an object of type `ty` holding its member defaults.
    ///
    /// Fails with [`HeapError::MissingConstructor`] for types registered
    /// without an accessible constructor.
    pub fn new_object(&mut self, registry: &TypeRegistry, ty: TypeKey) -> Result<ObjRef> {
        let entry = entry(registry, ty)?;
        let Some(object) = entry.object_info() else {
            return Err(HeapError::NotAnObject(entry.path().into()));
        };
        if !object.has_constructor() {
            return Err(HeapError::MissingConstructor(entry.path().into()));
        }
        let slots = entry
            .members()
            .iter()
            .map(|member| Slot::Loaded(registry.member_default(member)))
            .collect();
        self.alloc(ty, ObjectData::Fields(slots))
    }

    /// Allocates an array of type `ty`, e.g. `registry.array_of("i32")`.
    ///
    /// Byte arrays use [`Heap::new_bytes`].
    pub fn new_array(
        &mut self,
        registry: &TypeRegistry,
        ty: TypeKey,
        items: impl IntoIterator<Item = Value>,
    ) -> Result<ObjRef> {
        check_shape(registry, ty, "array", |shape| {
            matches!(shape, TypeShape::Array { .. }) && ty != TypeKey::BYTES
        })?;
        self.alloc(ty, ObjectData::Array(items.into_iter().collect()))
    }

    pub fn new_bytes(&mut self, bytes: impl Into<Vec<u8>>) -> Result<ObjRef> {
        self.alloc(TypeKey::BYTES, ObjectData::Bytes(bytes.into()))
    }

    pub fn new_list(
        &mut self,
        registry: &TypeRegistry,
        ty: TypeKey,
        items: impl IntoIterator<Item = Value>,
    ) -> Result<ObjRef> {
        check_shape(registry, ty, "list", |shape| {
            matches!(shape, TypeShape::List { .. })
        })?;
        self.alloc(ty, ObjectData::List(items.into_iter().collect()))
    }

    pub fn new_map(
        &mut self,
        registry: &TypeRegistry,
        ty: TypeKey,
        entries: impl IntoIterator<Item = (Value, Value)>,
    ) -> Result<ObjRef> {
        check_shape(registry, ty, "map", |shape| {
            matches!(shape, TypeShape::Map { .. })
        })?;
        self.alloc(ty, ObjectData::Map(entries.into_iter().collect()))
    }

    pub fn new_set(
        &mut self,
        registry: &TypeRegistry,
        ty: TypeKey,
        items: impl IntoIterator<Item = Value>,
    ) -> Result<ObjRef> {
        check_shape(registry, ty, "set", |shape| {
            matches!(shape, TypeShape::Set { .. })
        })?;
        self.alloc(ty, ObjectData::Set(items.into_iter().collect()))
    }

    impl_data_accessors! {
        fields, fields_mut: Fields => Vec<Slot>;
        array, array_mut: Array => Vec<Value>;
        bytes, bytes_mut: Bytes => Vec<u8>;
        list, list_mut: List => Vec<Value>;
        map, map_mut: Map => OrderedMap<Value, Value>;
        set, set_mut: Set => OrderedSet<Value>;
    }

    fn locate<'r>(
        &self,
        registry: &'r TypeRegistry,
        obj: ObjRef,
        name: &str,
    ) -> Result<(usize, &'r MemberInfo)> {
        let ty = self.type_of(obj)?;
        let entry = entry(registry, ty)?;
        match registry.member_index(ty, name) {
            Some(index) => Ok((index, &entry.members()[index])),
            None => Err(HeapError::NoSuchMember {
                ty: entry.path().into(),
                name: name.into(),
            }),
        }
    }

    /// Reads the member `name` of `obj`.
    ///
    /// A lazy member that was not resolved yet reads as its default.
    pub fn member(&self, registry: &TypeRegistry, obj: ObjRef, name: &str) -> Result<Value> {
        let (index, member) = self.locate(registry, obj, name)?;
        match self.slot_at(obj, index)? {
            Slot::Loaded(value) => Ok(value.clone()),
            Slot::Unloaded(_) => Ok(registry.member_default(member)),
        }
    }

    /// The raw slot of the member `name` of `obj`.
    pub fn slot(&self, registry: &TypeRegistry, obj: ObjRef, name: &str) -> Result<&Slot> {
        let (index, _) = self.locate(registry, obj, name)?;
        self.slot_at(obj, index)
    }

    pub fn set_member(
        &mut self,
        registry: &TypeRegistry,
        obj: ObjRef,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        let (index, _) = self.locate(registry, obj, name)?;
        self.set_slot(obj, index, Slot::Loaded(value.into()))
    }

    /// The slot at `index` in the flattened member list.
    pub fn slot_at(&self, obj: ObjRef, index: usize) -> Result<&Slot> {
        let slots = self.fields(obj)?;
        slots.get(index).ok_or(HeapError::ShapeMismatch {
            expected: "member slot",
            found: "end of object",
        })
    }

    pub fn set_slot(&mut self, obj: ObjRef, index: usize, slot: Slot) -> Result<()> {
        match self.fields_mut(obj)?.get_mut(index) {
            Some(target) => {
                *target = slot;
                Ok(())
            }
            None => Err(HeapError::ShapeMismatch {
                expected: "member slot",
                found: "end of object",
            }),
        }
    }

    /// Returns an iterator over every allocated object.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (ObjRef, &Object)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, object)| (ObjRef::new(i as u32), object))
    }
}

#[inline]
fn entry(registry: &TypeRegistry, ty: TypeKey) -> Result<&TypeEntry> {
    registry.get(ty).ok_or(HeapError::UnknownType(ty))
}

fn check_shape(
    registry: &TypeRegistry,
    ty: TypeKey,
    expected: &'static str,
    f: impl FnOnce(&TypeShape) -> bool,
) -> Result<()> {
    let entry = entry(registry, ty)?;
    if f(entry.info().shape()) {
        Ok(())
    } else {
        Err(HeapError::ShapeMismatch {
            expected,
            found: entry.info().kind().name(),
        })
    }
}
