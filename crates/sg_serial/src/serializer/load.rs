use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};
use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use sg_reflect::heap::{ObjectData, Slot, TypeRef};
use sg_reflect::info::{MemberKind, TypeShape};
use sg_reflect::registry::{TypeKey, TypeRegistry};
use sg_reflect::value::{EnumValue, Version};
use sg_reflect::{Heap, ObjRef, Value};

use super::object_ref::read_head;
use super::table::{NULL_TYPE_INDEX, RepoContext};
use crate::header::Header;
use crate::repo::{Shape, TypeRepo};
use crate::schema::{SchemaFlags, TypeSchema, stricter};
use crate::wire::{
    date_time_from_ticks, invalid_data, read_date_time_offset, read_primitive, read_str,
    skip_primitive, time_span_from_ticks,
};
use crate::{Error, Result};

static NEXT_SESSION: AtomicU32 = AtomicU32::new(1);

/// The root reference of a stream.
pub(crate) enum RootRef {
    Null,
    Inline(Value),
    Object(u16, u32),
}

/// The state of one load, kept alive for lazy members.
pub(crate) struct LoadSession {
    pub id: u32,
    pub header: Header,
    pub repos: Vec<TypeRepo>,
    pub data: Vec<u8>,
    queue: VecDeque<(u16, u32)>,
}

impl LoadSession {
    /// Parses the header block, creates every repo and reads the data sections.
    pub fn read<R: Read>(r: &mut R, cx: &RepoContext<'_>, lazy: bool) -> Result<(Self, RootRef)> {
        let header = Header::read(r)?;

        let count = r.read_u16::<LittleEndian>()?;
        let schemas = (0..count)
            .map(|_| TypeSchema::read(r))
            .collect::<std::io::Result<Vec<_>>>()?;
        for schema in &schemas {
            let indices = schema.elements.iter().chain(schema.members.iter().map(|m| &m.type_index));
            if let Some(bad) = indices.copied().find(|index| *index >= count) {
                return Err(Error::InvalidTypeIndex(bad));
            }
        }

        let root = match r.read_u16::<LittleEndian>()? {
            NULL_TYPE_INDEX => RootRef::Null,
            index if index >= count => return Err(Error::InvalidTypeIndex(index)),
            index => match schemas[index as usize].primitive {
                Some(kind) => RootRef::Inline(read_primitive(r, kind)?),
                None => RootRef::Object(index, r.read_u32::<LittleEndian>()?),
            },
        };

        let mut data = Vec::new();
        r.read_to_end(&mut data)?;

        let mut repos = Vec::with_capacity(schemas.len());
        for (index, mut schema) in schemas.into_iter().enumerate() {
            schema.runtime_type = cx.registry.resolve_lenient(&schema.path);
            match schema.runtime_type {
                Some(key) => {
                    let serialized = schema.is_serialized() && cx.privacy.is_serialized(key);
                    schema.flags.set(SchemaFlags::SERIALIZED, serialized);
                }
                None if schema.num_objects > 0 => {
                    log::warn!("{}", Error::UnknownType(schema.path().into()));
                }
                None => {}
            }
            let shape = cx.creators.create(&schema, cx.registry);
            log::debug!("repo {index} for `{}`: {shape:?}", schema.path());
            repos.push(TypeRepo::new(index as u16, schema, shape));
        }

        for index in 0..repos.len() {
            if repos[index].shape == Shape::Object {
                bind_members(&mut repos, index, cx, lazy);
            }
        }
        for repo in &mut repos {
            repo.load_header(&data)?;
        }

        let session = Self {
            id: NEXT_SESSION.fetch_add(1, Ordering::Relaxed),
            header,
            repos,
            data,
            queue: VecDeque::new(),
        };
        Ok((session, root))
    }
}

/// Matches the stored members of repo `index` against the live type.
///
/// A member is loadable if the live type still has a serialized member of
/// that name, its declared type did not change and it passes the privacy
/// filter. Everything else is skipped on load.
fn bind_members(repos: &mut [TypeRepo], index: usize, cx: &RepoContext<'_>, lazy: bool) {
    let Some(owner) = repos[index].schema.runtime_type else {
        return;
    };
    let Some(entry) = cx.registry.get(owner) else {
        return;
    };

    let mut bindings = Vec::with_capacity(repos[index].schema.members.len());
    for member in &repos[index].schema.members {
        let Some(slot) = cx.registry.member_index(owner, &member.name) else {
            log::debug!("`{}::{}` no longer exists", entry.path(), member.name);
            bindings.push((None, false, false));
            continue;
        };
        let live = &entry.members()[slot];
        let is_lazy = lazy && live.kind() == MemberKind::Property && live.is_virtual();

        let stored = &repos[member.type_index as usize].schema;
        let live_type = cx.registry.key_of(live.type_path());
        let loadable = if !live.is_serialized() {
            false
        } else if stored.runtime_type.is_none() {
            log::debug!("`{}::{}` holds an unknown type", entry.path(), member.name);
            false
        } else if stored.runtime_type != live_type {
            log::warn!(
                "{}",
                Error::TypeChanged {
                    member: alloc::format!("{}::{}", entry.path(), member.name),
                    stored: stored.path().into(),
                    live: live.type_path().into(),
                }
            );
            false
        } else {
            let visibility = stricter(member.visibility, live.visibility());
            let allowed = cx.privacy.member_allowed(owner, visibility);
            if !allowed {
                log::debug!("`{}::{}` is filtered out", entry.path(), member.name);
            }
            allowed
        };
        bindings.push((Some(slot), loadable, is_lazy));
    }

    for (member, (slot, loadable, is_lazy)) in repos[index].schema.members.iter_mut().zip(bindings) {
        member.slot = slot;
        member.is_loadable = loadable;
        member.is_lazy = is_lazy;
    }
}

/// Materializes objects of a [`LoadSession`] into a heap.
pub(crate) struct Loader<'a> {
    registry: &'a TypeRegistry,
    heap: &'a mut Heap,
    session: &'a mut LoadSession,
}

impl<'a> Loader<'a> {
    pub fn new(registry: &'a TypeRegistry, heap: &'a mut Heap, session: &'a mut LoadSession) -> Self {
        Self {
            registry,
            heap,
            session,
        }
    }

    fn repo(&self, index: u16) -> Result<&TypeRepo> {
        self.session
            .repos
            .get(index as usize)
            .ok_or(Error::InvalidTypeIndex(index))
    }

    fn runtime_type(&self, index: u16) -> Result<TypeKey> {
        let schema = &self.repo(index)?.schema;
        schema
            .runtime_type
            .ok_or_else(|| Error::UnknownType(schema.path().into()))
    }

    pub fn root(&mut self, root: RootRef) -> Result<Value> {
        match root {
            RootRef::Null => Ok(Value::Null),
            RootRef::Inline(value) => Ok(value),
            RootRef::Object(index, obj) => self.load_object(index, obj),
        }
    }

    /// Returns object `obj` of repo `index`, creating it on first request.
    pub fn load_object(&mut self, index: u16, obj: u32) -> Result<Value> {
        let repo = self.repo(index)?;
        match repo.loaded.get(obj as usize) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => self.create_object(index, obj),
            None => Err(Error::InvalidObjectIndex {
                ty: repo.schema.path().into(),
                index: obj,
            }),
        }
    }

    /// Allocates the shell of an object and records it before anything
    /// else is read, so references back to it resolve to the same object.
    ///
    /// Value shapes are decoded right away, containers and objects are
    /// queued for [`Loader::process_load_queue`].
    fn create_object(&mut self, index: u16, obj: u32) -> Result<Value> {
        let repo = self.repo(index)?;
        let shape = repo.shape;
        let value = match shape {
            Shape::Unknown(reason) => {
                log::trace!("object {obj} of `{}` reads as null ({reason})", repo.schema.path());
                Value::Null
            }
            Shape::Primitive(_) => {
                return Err(Error::InvalidObjectIndex {
                    ty: repo.schema.path().into(),
                    index: obj,
                });
            }
            Shape::Bytes => {
                let bytes = repo.payload(&self.session.data, obj).to_vec();
                Value::Ref(self.heap.new_bytes(bytes)?)
            }
            Shape::Array => {
                let ty = self.runtime_type(index)?;
                let repo = self.repo(index)?;
                let len = (repo.length(obj) as usize).min(repo.payload(&self.session.data, obj).len());
                let items = alloc::vec![Value::Null; len];
                Value::Ref(self.heap.alloc(ty, ObjectData::Array(items))?)
            }
            Shape::List => self.alloc(index, ObjectData::List(Vec::new()))?,
            Shape::Map => self.alloc(index, ObjectData::Map(Default::default()))?,
            Shape::Set => self.alloc(index, ObjectData::Set(Default::default()))?,
            Shape::Object => {
                let ty = self.runtime_type(index)?;
                match self.heap.new_object(self.registry, ty) {
                    Ok(obj) => Value::Ref(obj),
                    Err(e) => {
                        log::warn!("cannot construct a `{}`: {e}", self.repo(index)?.schema.path());
                        Value::Null
                    }
                }
            }
            _ => {
                let payload = repo.payload(&self.session.data, obj).to_vec();
                self.decode_value(index, shape, &payload).unwrap_or_else(|e| {
                    log::warn!("cannot load object {obj} of `{}`: {e}", self.session.repos[index as usize].schema.path());
                    Value::Null
                })
            }
        };

        self.session.repos[index as usize].loaded[obj as usize] = Some(value.clone());
        if value.as_obj().is_some()
            && matches!(shape, Shape::Array | Shape::List | Shape::Map | Shape::Set | Shape::Object)
        {
            self.session.queue.push_back((index, obj));
        }
        Ok(value)
    }

    fn alloc(&mut self, index: u16, data: ObjectData) -> Result<Value> {
        let ty = self.runtime_type(index)?;
        Ok(Value::Ref(self.heap.alloc(ty, data)?))
    }

    /// Decodes the payload of a value shape.
    fn decode_value(&self, index: u16, shape: Shape, payload: &[u8]) -> Result<Value> {
        let r = &mut Cursor::new(payload);
        Ok(match shape {
            Shape::String => Value::String(read_str(r)?),
            Shape::TimeZone => Value::TimeZone(read_str(r)?),
            Shape::Enum => {
                let ty = self.runtime_type(index)?;
                let raw = i64::from(r.read_i32::<LittleEndian>()?);
                let value = match self.registry.get(ty).map(|entry| entry.info().shape()) {
                    Some(TypeShape::Enum(info)) => info.narrow(raw),
                    _ => raw,
                };
                Value::Enum(EnumValue { ty, value })
            }
            Shape::DateTime => Value::DateTime(date_time_from_ticks(r.read_i64::<LittleEndian>()?)?),
            Shape::DateTimeOffset => Value::DateTimeOffset(read_date_time_offset(r)?),
            Shape::TimeSpan => Value::TimeSpan(time_span_from_ticks(r.read_i64::<LittleEndian>()?)?),
            Shape::Version => {
                let text = read_str(r)?;
                let version: Version = text.parse().map_err(|_| invalid_data("invalid version"))?;
                Value::Version(version)
            }
            Shape::Type => {
                let path = read_str(r)?;
                match self.registry.resolve_lenient(&path) {
                    Some(key) => Value::Type(key),
                    None => {
                        log::warn!("{}", Error::UnknownType(path.as_ref().into()));
                        Value::Null
                    }
                }
            }
            _ => Value::Null,
        })
    }

    /// Fills every queued shell, breadth first.
    ///
    /// A failing object is logged and keeps what was read so far.
    pub fn process_load_queue(&mut self) {
        while let Some((index, obj)) = self.session.queue.pop_front() {
            if let Err(e) = self.load_object_data(index, obj) {
                let path = self.session.repos[index as usize].schema.path();
                log::warn!("cannot load object {obj} of `{path}`: {e}");
            }
        }
    }

    fn element(&self, index: u16, i: usize) -> Result<u16> {
        self.repo(index)?
            .schema
            .elements
            .get(i)
            .copied()
            .ok_or(Error::InvalidTypeIndex(NULL_TYPE_INDEX))
    }

    fn load_object_data(&mut self, index: u16, obj: u32) -> Result<()> {
        let repo = self.repo(index)?;
        let shape = repo.shape;
        let Some(handle) = repo.loaded[obj as usize].as_ref().and_then(Value::as_obj) else {
            return Ok(());
        };
        let payload = repo.payload(&self.session.data, obj).to_vec();
        let r = &mut Cursor::new(payload.as_slice());

        match shape {
            Shape::Array => {
                let elem = self.element(index, 0)?;
                let len = self.heap.array(handle)?.len();
                for i in 0..len {
                    let value = self.load_object_ref(r, elem)?;
                    self.heap.array_mut(handle)?[i] = value;
                }
            }
            Shape::List => {
                let elem = self.element(index, 0)?;
                for _ in 0..r.read_u32::<LittleEndian>()? {
                    let value = self.load_object_ref(r, elem)?;
                    self.heap.list_mut(handle)?.push(value);
                }
            }
            Shape::Set => {
                let elem = self.element(index, 0)?;
                for _ in 0..r.read_u32::<LittleEndian>()? {
                    let value = self.load_object_ref(r, elem)?;
                    self.heap.set_mut(handle)?.insert(value);
                }
            }
            Shape::Map => {
                let (key_type, value_type) = (self.element(index, 0)?, self.element(index, 1)?);
                for _ in 0..r.read_u32::<LittleEndian>()? {
                    let key = self.load_object_ref(r, key_type)?;
                    let value = self.load_object_ref(r, value_type)?;
                    if key.is_null() {
                        let path = self.session.repos[index as usize].schema.path();
                        log::warn!("dropping an entry of `{path}` whose key loaded as null");
                        continue;
                    }
                    self.heap.map_mut(handle)?.insert(key, value);
                }
            }
            Shape::Object => self.load_members(index, handle, r)?,
            _ => {}
        }
        Ok(())
    }

    fn load_members(&mut self, index: u16, obj: ObjRef, r: &mut Cursor<&[u8]>) -> Result<()> {
        for i in 0..self.repo(index)?.schema.members.len() {
            let member = self.session.repos[index as usize].schema.members[i].clone();
            match (member.slot, member.is_lazy, member.is_loadable) {
                (Some(slot), true, loadable) => {
                    let lazy = self.load_lazy_object_ref(r, member.type_index, loadable)?;
                    self.heap.set_slot(obj, slot, lazy)?;
                }
                (Some(slot), false, true) => {
                    let value = self.load_object_ref(r, member.type_index)?;
                    let unchanged = value.primitive_kind().is_some()
                        && matches!(self.heap.slot_at(obj, slot)?, Slot::Loaded(current) if *current == value);
                    if !unchanged {
                        self.heap.set_slot(obj, slot, Slot::Loaded(value))?;
                    }
                }
                _ => self.skip_object_ref(r, member.type_index)?,
            }
        }
        Ok(())
    }

    fn checked_head<R: Read>(&self, r: &mut R, declared: u16) -> Result<Option<u16>> {
        match read_head(r, declared)? {
            Some(index) if index as usize >= self.session.repos.len() => Err(Error::InvalidTypeIndex(index)),
            head => Ok(head),
        }
    }

    /// Reads a reference and materializes its target.
    pub fn load_object_ref<R: Read>(&mut self, r: &mut R, declared: u16) -> Result<Value> {
        let Some(index) = self.checked_head(r, declared)? else {
            return Ok(Value::Null);
        };
        if let Some(kind) = self.session.repos[index as usize].schema.primitive {
            return Ok(read_primitive(r, kind)?);
        }
        let obj = r.read_u32::<LittleEndian>()?;
        let value = self.load_object(index, obj)?;

        if index != declared {
            let actual = self.session.repos[index as usize].schema.runtime_type;
            let expected = self.repo(declared)?.schema.runtime_type;
            if let (Some(from), Some(to)) = (actual, expected)
                && !self.registry.is_assignable(from, to)
            {
                log::debug!("a loaded `{from}` no longer derives from `{to}`, reading null");
                return Ok(Value::Null);
            }
        }
        Ok(value)
    }

    /// Consumes a reference without materializing anything.
    pub fn skip_object_ref<R: Read>(&self, r: &mut R, declared: u16) -> Result<()> {
        let Some(index) = self.checked_head(r, declared)? else {
            return Ok(());
        };
        match self.session.repos[index as usize].schema.primitive {
            Some(kind) => skip_primitive(r, kind)?,
            None => {
                r.read_u32::<LittleEndian>()?;
            }
        }
        Ok(())
    }

    /// Reads a reference into a lazy slot without materializing its target.
    ///
    /// Non-loadable members consume their bytes and stay unloaded for good.
    pub fn load_lazy_object_ref<R: Read>(&mut self, r: &mut R, declared: u16, loadable: bool) -> Result<Slot> {
        let Some(index) = self.checked_head(r, declared)? else {
            return Ok(if loadable { Slot::Loaded(Value::Null) } else { Slot::Unloaded(None) });
        };
        if let Some(kind) = self.session.repos[index as usize].schema.primitive {
            let value = read_primitive(r, kind)?;
            return Ok(if loadable { Slot::Loaded(value) } else { Slot::Unloaded(None) });
        }
        let obj = r.read_u32::<LittleEndian>()?;
        if !loadable {
            return Ok(Slot::Unloaded(None));
        }
        Ok(Slot::Unloaded(Some(TypeRef {
            session: self.session.id,
            type_index: index,
            index: obj,
        })))
    }
}
