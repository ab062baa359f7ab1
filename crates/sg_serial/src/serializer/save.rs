use alloc::collections::VecDeque;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use sg_reflect::{Heap, Value};

use super::object_ref::{NULL_REF, write_head};
use super::table::{NULL_TYPE_INDEX, RepoContext, TypeTable, member_value, runtime_type};
use crate::header::Header;
use crate::repo::Shape;
use crate::wire::{
    date_time_ticks, time_span_ticks, write_date_time_offset, write_primitive, write_str,
};
use crate::{Error, Result};

/// One save: breadth-first discovery, then emission.
pub(crate) struct SaveSession<'a> {
    cx: RepoContext<'a>,
    heap: &'a Heap,
    table: TypeTable,
    queue: VecDeque<(u16, u32)>,
}

impl<'a> SaveSession<'a> {
    pub fn new(cx: RepoContext<'a>, heap: &'a Heap) -> Self {
        Self {
            cx,
            heap,
            table: TypeTable::default(),
            queue: VecDeque::new(),
        }
    }

    fn type_path(&self, index: u16) -> &str {
        self.table.repo(index).schema.path()
    }

    /// Where `value` lives: its repo and, for non-primitives, its object index.
    ///
    /// `None` if the value is null or is not written.
    fn locate(&self, value: &Value) -> Result<Option<(u16, Option<u32>)>> {
        let Some(key) = runtime_type(self.heap, value)? else {
            return Ok(None);
        };
        let Some(index) = self.table.index_of_type(self.cx.registry, key) else {
            return Ok(None);
        };
        let repo = self.table.repo(index);
        Ok(match repo.shape {
            Shape::Unknown(_) => None,
            Shape::Primitive(_) => Some((index, None)),
            _ => repo.index_of(value).map(|obj| (index, Some(obj))),
        })
    }

    // -------------------------------------------------------------------------
    // Discovery

    /// Indexes `value` and queues it on first encounter.
    fn add_object_ref(&mut self, value: &Value) -> Result<()> {
        let Some(key) = runtime_type(self.heap, value)? else {
            return Ok(());
        };
        let index = self.table.get_or_create(&self.cx, key)?;
        let repo = &mut self.table.repos[index as usize];
        match repo.shape {
            Shape::Primitive(_) => {}
            Shape::Unknown(reason) => {
                log::trace!("skipping a `{}` ({reason})", repo.schema.path());
            }
            _ => {
                let (obj, added) = repo.get_or_add(value);
                if added {
                    self.queue.push_back((index, obj));
                }
            }
        }
        Ok(())
    }

    /// The values directly owned by object `obj` of repo `index`.
    fn child_objects(&self, index: u16, obj: u32) -> Result<Vec<Value>> {
        let repo = self.table.repo(index);
        let Some(handle) = repo.objects[obj as usize].as_obj() else {
            return Ok(Vec::new());
        };
        let heap = self.heap;
        Ok(match repo.shape {
            Shape::Object => repo
                .schema
                .members
                .iter()
                .filter_map(|member| member.slot)
                .map(|slot| member_value(self.cx.registry, heap, handle, slot))
                .collect::<Result<Vec<_>, _>>()?,
            Shape::Array => heap.array(handle)?.clone(),
            Shape::List => heap.list(handle)?.clone(),
            Shape::Set => heap.set(handle)?.iter().cloned().collect(),
            Shape::Map => heap
                .map(handle)?
                .iter()
                .flat_map(|(k, v)| [k.clone(), v.clone()])
                .collect(),
            _ => Vec::new(),
        })
    }

    /// Phase one: index every object reachable from `root`.
    pub fn discover(&mut self, root: &Value) -> Result<()> {
        self.add_object_ref(root)?;
        while let Some((index, obj)) = self.queue.pop_front() {
            let children = match self.child_objects(index, obj) {
                Ok(children) => children,
                Err(e @ Error::Deferred(_)) => return Err(e),
                Err(e) => {
                    log::error!("cannot walk object {obj} of `{}`: {e}", self.type_path(index));
                    continue;
                }
            };
            for child in &children {
                if let Err(e) = self.add_object_ref(child) {
                    log::error!("cannot index a child of `{}`: {e}", self.type_path(index));
                }
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Emission

    fn mismatch(&self, declared: u16, value: &Value) -> Error {
        let found = match runtime_type(self.heap, value) {
            Ok(Some(key)) => self
                .cx
                .registry
                .get(key)
                .map_or_else(|| key.to_string(), |entry| entry.path().into()),
            _ => String::from("null"),
        };
        Error::TypeMismatch {
            declared: self.type_path(declared).into(),
            found,
        }
    }

    /// Writes `value` as a reference to a value declared as type `declared`.
    fn write_object_ref<W: Write>(&self, w: &mut W, declared: u16, value: &Value) -> Result<()> {
        let declared_repo = self.table.repo(declared);
        let located = match declared_repo.shape {
            Shape::Unknown(_) => None,
            _ => self.locate(value)?,
        };
        let Some((actual, obj)) = located else {
            w.write_u8(NULL_REF)?;
            return Ok(());
        };

        if actual != declared {
            let assignable = match (
                self.table.repo(actual).schema.runtime_type,
                declared_repo.schema.runtime_type,
            ) {
                (Some(from), Some(to)) => self.cx.registry.is_assignable(from, to),
                _ => false,
            };
            if !assignable || !declared_repo.schema.has_sub_type() {
                return Err(self.mismatch(declared, value));
            }
        }
        write_head(w, declared, actual)?;

        match (self.table.repo(actual).schema.primitive, obj) {
            (Some(kind), _) => write_primitive(w, kind, value),
            (None, Some(obj)) => Ok(w.write_u32::<LittleEndian>(obj)?),
            (None, None) => Err(self.mismatch(declared, value)),
        }
    }

    fn write_refs<'v, W: Write>(
        &self,
        w: &mut W,
        declared: u16,
        values: impl ExactSizeIterator<Item = &'v Value>,
    ) -> Result<()> {
        w.write_u32::<LittleEndian>(values.len() as u32)?;
        for value in values {
            self.write_object_ref(w, declared, value)?;
        }
        Ok(())
    }

    fn element(&self, index: u16, i: usize) -> Result<u16> {
        self.table
            .repo(index)
            .schema
            .elements
            .get(i)
            .copied()
            .ok_or(Error::InvalidTypeIndex(NULL_TYPE_INDEX))
    }

    /// The payload of one object.
    fn save_object(&self, index: u16, value: &Value, w: &mut Vec<u8>) -> Result<()> {
        let repo = self.table.repo(index);
        let heap = self.heap;
        match (repo.shape, value) {
            (Shape::String, Value::String(s)) | (Shape::TimeZone, Value::TimeZone(s)) => {
                write_str(w, s)?;
            }
            (Shape::Enum, Value::Enum(e)) => w.write_i32::<LittleEndian>(e.value as i32)?,
            (Shape::DateTime, Value::DateTime(d)) => {
                w.write_i64::<LittleEndian>(date_time_ticks(d))?;
            }
            (Shape::DateTimeOffset, Value::DateTimeOffset(d)) => write_date_time_offset(w, d)?,
            (Shape::TimeSpan, Value::TimeSpan(d)) => {
                w.write_i64::<LittleEndian>(time_span_ticks(d))?;
            }
            (Shape::Version, Value::Version(v)) => write_str(w, &v.to_string())?,
            (Shape::Type, Value::Type(key)) => {
                let entry = self.cx.registry.get(*key);
                let entry = entry.ok_or_else(|| Error::UnknownType(key.to_string()))?;
                write_str(w, entry.path())?;
            }
            (Shape::Bytes, Value::Ref(obj)) => w.write_all(heap.bytes(*obj)?)?,
            (Shape::Array, Value::Ref(obj)) => {
                let elem = self.element(index, 0)?;
                for item in heap.array(*obj)? {
                    self.write_object_ref(w, elem, item)?;
                }
            }
            (Shape::List, Value::Ref(obj)) => {
                self.write_refs(w, self.element(index, 0)?, heap.list(*obj)?.iter())?;
            }
            (Shape::Set, Value::Ref(obj)) => {
                self.write_refs(w, self.element(index, 0)?, heap.set(*obj)?.iter())?;
            }
            (Shape::Map, Value::Ref(obj)) => {
                let (key, val) = (self.element(index, 0)?, self.element(index, 1)?);
                let map = heap.map(*obj)?;
                w.write_u32::<LittleEndian>(map.len() as u32)?;
                for (k, v) in map.iter() {
                    self.write_object_ref(w, key, k)?;
                    self.write_object_ref(w, val, v)?;
                }
            }
            (Shape::Object, Value::Ref(obj)) => {
                for member in &repo.schema.members {
                    let Some(slot) = member.slot else { continue };
                    let value = member_value(self.cx.registry, heap, *obj, slot)?;
                    self.write_object_ref(w, member.type_index, &value)?;
                }
            }
            (_, value) => return Err(self.mismatch(index, value)),
        }
        Ok(())
    }

    /// The element count written to the custom header of array types.
    fn array_length(&self, index: u16, value: &Value) -> Result<u32> {
        let Some(obj) = value.as_obj() else {
            return Err(self.mismatch(index, value));
        };
        let len = match self.table.repo(index).shape {
            Shape::Bytes => self.heap.bytes(obj)?.len(),
            _ => self.heap.array(obj)?.len(),
        };
        Ok(len as u32)
    }

    /// Phase two: one data section per repo, in type index order.
    ///
    /// A failing object is logged and written with an empty payload.
    pub fn emit(&mut self) -> Result<Vec<Vec<u8>>> {
        let mut sections = Vec::with_capacity(self.table.repos.len());
        let mut offset = 0_u64;

        for index in 0..self.table.repos.len() as u16 {
            let repo = self.table.repo(index);
            let has_lengths = matches!(repo.shape, Shape::Array | Shape::Bytes);
            let count = repo.objects.len();

            let mut section = Vec::new();
            let mut sizes = Vec::with_capacity(count);
            let mut payloads = Vec::new();
            for (obj, value) in repo.objects.iter().enumerate() {
                if has_lengths {
                    let len = self.array_length(index, value).unwrap_or_else(|e| {
                        log::error!("cannot measure object {obj} of `{}`: {e}", repo.schema.path());
                        0
                    });
                    section.write_u32::<LittleEndian>(len)?;
                }

                let start = payloads.len();
                if let Err(e) = self.save_object(index, value, &mut payloads) {
                    log::error!("cannot save object {obj} of `{}`: {e}", repo.schema.path());
                    payloads.truncate(start);
                }
                sizes.push((payloads.len() - start) as u32);
            }
            for size in sizes {
                section.write_u32::<LittleEndian>(size)?;
            }
            section.extend_from_slice(&payloads);

            let schema = &mut self.table.repos[index as usize].schema;
            schema.num_objects = count as u32;
            schema.data_offset = offset;
            schema.data_size = section.len() as u64;
            offset += section.len() as u64;
            sections.push(section);
        }
        Ok(sections)
    }

    // -------------------------------------------------------------------------
    // Stream

    fn write_root<W: Write>(&self, w: &mut W, root: &Value) -> Result<()> {
        let Some((index, obj)) = self.locate(root)? else {
            w.write_u16::<LittleEndian>(NULL_TYPE_INDEX)?;
            return Ok(());
        };
        w.write_u16::<LittleEndian>(index)?;
        match (self.table.repo(index).schema.primitive, obj) {
            (Some(kind), _) => write_primitive(w, kind, root),
            (None, Some(obj)) => Ok(w.write_u32::<LittleEndian>(obj)?),
            (None, None) => Err(self.mismatch(index, root)),
        }
    }

    /// Writes the header block followed by `sections`.
    pub fn write<W: Write>(
        &self,
        w: &mut W,
        name: &str,
        root: &Value,
        sections: &[Vec<u8>],
    ) -> Result<()> {
        Header::new(name).write(w)?;
        w.write_u16::<LittleEndian>(self.table.repos.len() as u16)?;
        for repo in &self.table.repos {
            repo.schema.write(w)?;
        }
        self.write_root(w, root)?;
        for section in sections {
            w.write_all(section)?;
        }
        log::debug!(
            "saved {} objects of {} types",
            self.table.repos.iter().map(|repo| repo.objects.len()).sum::<usize>(),
            self.table.repos.len()
        );
        Ok(())
    }
}
