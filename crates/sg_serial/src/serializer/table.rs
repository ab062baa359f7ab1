use alloc::sync::Arc;
use alloc::vec::Vec;

use sg_reflect::heap::{HeapError, Slot};
use sg_reflect::registry::{TypeKey, TypeRegistry};
use sg_reflect::{Heap, ObjRef, Value};
use sg_utils::hash::HashMap;

use crate::repo::{RepoCreators, Shape, TypeRepo, UnknownReason};
use crate::schema::{Privacy, TypeSchema};
use crate::{Error, Result};

/// Type index of the null root.
pub(crate) const NULL_TYPE_INDEX: u16 = u16::MAX;

/// Everything a session needs to build repos.
#[derive(Clone, Copy)]
pub(crate) struct RepoContext<'a> {
    pub registry: &'a TypeRegistry,
    pub creators: &'a RepoCreators,
    pub privacy: Privacy<'a>,
}

/// The repos of a save or clone session, created on first encounter.
#[derive(Default)]
pub(crate) struct TypeTable {
    pub repos: Vec<TypeRepo>,
    path_to_index: HashMap<Arc<str>, u16>,
}

impl TypeTable {
    #[inline]
    pub fn repo(&self, index: u16) -> &TypeRepo {
        &self.repos[index as usize]
    }

    /// The index of the repo of `key`, if one was created.
    pub fn index_of_type(&self, registry: &TypeRegistry, key: TypeKey) -> Option<u16> {
        let entry = registry.get(key)?;
        self.path_to_index.get(entry.path()).copied()
    }

    fn push(&mut self, schema: TypeSchema, shape: Shape) -> Result<u16> {
        let index = u16::try_from(self.repos.len())
            .ok()
            .filter(|index| *index != NULL_TYPE_INDEX)
            .ok_or(Error::TooManyTypes(NULL_TYPE_INDEX as usize))?;
        log::debug!("repo {index} for `{}`: {shape:?}", schema.path());
        self.path_to_index.insert(schema.path.clone(), index);
        self.repos.push(TypeRepo::new(index, schema, shape));
        Ok(index)
    }

    /// Returns the repo index of the live type `key`, creating the repo and
    /// the repos of its element and member types on first encounter.
    pub fn get_or_create(&mut self, cx: &RepoContext<'_>, key: TypeKey) -> Result<u16> {
        let Some(entry) = cx.registry.get(key) else {
            return Err(Error::UnknownType(alloc::format!("{key}")));
        };
        if let Some(index) = self.path_to_index.get(entry.path()) {
            return Ok(*index);
        }

        let mut schema = TypeSchema::describe(cx.registry, key, &cx.privacy);
        let shape = cx.creators.create(&schema, cx.registry);
        if shape.is_unknown() {
            schema.members.clear();
            return self.push(schema, shape);
        }
        // Registered before recursing, so self-referencing types terminate.
        let index = self.push(schema, shape)?;

        for path in entry.info().shape().element_paths() {
            let elem = self.get_or_create_path(cx, path)?;
            self.repos[index as usize].schema.elements.push(elem);
        }

        for i in 0..self.repos[index as usize].schema.members.len() {
            let Some(slot) = self.repos[index as usize].schema.members[i].slot else {
                continue;
            };
            let member_type = entry.members()[slot].type_path();
            let type_index = self.get_or_create_path(cx, member_type)?;
            self.repos[index as usize].schema.members[i].type_index = type_index;
        }
        Ok(index)
    }

    /// Like [`TypeTable::get_or_create`], by path.
    ///
    /// Paths the registry does not know get an unknown stub.
    pub fn get_or_create_path(&mut self, cx: &RepoContext<'_>, path: &str) -> Result<u16> {
        if let Some(key) = cx.registry.key_of(path) {
            return self.get_or_create(cx, key);
        }
        if let Some(index) = self.path_to_index.get(path) {
            return Ok(*index);
        }
        log::debug!("`{path}` is not registered, values declared with it are written as null");
        self.push(
            TypeSchema::unresolved(path.into()),
            Shape::Unknown(UnknownReason::UnknownType),
        )
    }
}

/// The runtime type of `value`, `None` for null.
pub(crate) fn runtime_type(heap: &Heap, value: &Value) -> Result<Option<TypeKey>, HeapError> {
    match value {
        Value::Null => Ok(None),
        Value::Ref(obj) => heap.type_of(*obj).map(Some),
        other => Ok(other.inline_type()),
    }
}

/// The value held by member `slot` of `obj`.
///
/// Members whose stored bytes were not loadable read as their default.
/// Lazy members that were never resolved fail with [`Error::Deferred`].
pub(crate) fn member_value(
    registry: &TypeRegistry,
    heap: &Heap,
    obj: ObjRef,
    slot: usize,
) -> Result<Value> {
    match heap.slot_at(obj, slot)? {
        Slot::Loaded(value) => Ok(value.clone()),
        Slot::Unloaded(target) => {
            let ty = heap.type_of(obj)?;
            let entry = registry.get(ty).ok_or(HeapError::UnknownType(ty))?;
            let member = entry.members().get(slot);
            if target.is_some() {
                let name = member.map_or("?", |member| member.name());
                return Err(Error::Deferred(alloc::format!("{}.{name}", entry.path())));
            }
            Ok(member.map_or(Value::Null, |member| registry.member_default(member)))
        }
    }
}
