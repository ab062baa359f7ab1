use alloc::collections::VecDeque;
use alloc::vec::Vec;

use sg_reflect::heap::{ObjectData, Slot};
use sg_reflect::{Heap, ObjRef, Value};
use sg_utils::hash::NoOpHashMap;

use super::table::{RepoContext, TypeTable, member_value, runtime_type};
use crate::repo::Shape;
use crate::{Error, Result};

/// An in-memory deep copy driven by the repos, without a byte stream.
///
/// Like a load, shells are allocated and recorded first and filled from
/// a queue afterwards, so shared and cyclic references keep their identity.
pub(crate) struct Cloner<'a> {
    cx: RepoContext<'a>,
    heap: &'a mut Heap,
    table: TypeTable,
    copies: NoOpHashMap<ObjRef, Value>,
    queue: VecDeque<(ObjRef, ObjRef, u16)>,
}

impl<'a> Cloner<'a> {
    pub fn new(cx: RepoContext<'a>, heap: &'a mut Heap) -> Self {
        Self {
            cx,
            heap,
            table: TypeTable::default(),
            copies: NoOpHashMap::default(),
            queue: VecDeque::new(),
        }
    }

    /// Copies the graph below `root`.
    ///
    /// Value-like roots are assigned, never cloned.
    pub fn clone_root(mut self, root: &Value) -> Result<Value> {
        match root {
            Value::Null => Ok(Value::Null),
            Value::Ref(_) => {
                let copy = self.clone_value(root)?;
                self.populate_all();
                Ok(copy)
            }
            other => {
                let path = match other.inline_type().and_then(|key| self.cx.registry.get(key)) {
                    Some(entry) => entry.path().into(),
                    None => alloc::format!("{other:?}"),
                };
                Err(Error::NotCloneable(path))
            }
        }
    }

    /// The copy of `value`: inline values are assigned, objects are copied once.
    fn clone_value(&mut self, value: &Value) -> Result<Value> {
        let Some(key) = runtime_type(self.heap, value)? else {
            return Ok(Value::Null);
        };
        let index = self.table.get_or_create(&self.cx, key)?;
        match (value, self.table.repo(index).shape) {
            (_, Shape::Unknown(_)) => Ok(Value::Null),
            (Value::Ref(src), _) => match self.copies.get(src) {
                Some(copy) => Ok(copy.clone()),
                None => self.clone_object(index, *src),
            },
            (other, _) => Ok(other.clone()),
        }
    }

    /// Allocates the copy of `src` and queues it for population.
    fn clone_object(&mut self, index: u16, src: ObjRef) -> Result<Value> {
        let repo = self.table.repo(index);
        let ty = self.heap.type_of(src)?;
        let copy = match repo.shape {
            Shape::Unknown(_) => Value::Null,
            shape if shape.is_value_like() => {
                return Err(Error::NotCloneable(repo.schema.path().into()));
            }
            Shape::Bytes => {
                let bytes = self.heap.bytes(src)?.clone();
                Value::Ref(self.heap.new_bytes(bytes)?)
            }
            Shape::Array => {
                let len = self.heap.array(src)?.len();
                Value::Ref(self.heap.alloc(ty, ObjectData::Array(alloc::vec![Value::Null; len]))?)
            }
            Shape::List => Value::Ref(self.heap.alloc(ty, ObjectData::List(Vec::new()))?),
            Shape::Map => Value::Ref(self.heap.alloc(ty, ObjectData::Map(Default::default()))?),
            Shape::Set => Value::Ref(self.heap.alloc(ty, ObjectData::Set(Default::default()))?),
            _ => match self.heap.new_object(self.cx.registry, ty) {
                Ok(obj) => Value::Ref(obj),
                Err(e) => {
                    log::warn!("cannot construct a `{}`: {e}", repo.schema.path());
                    Value::Null
                }
            },
        };

        self.copies.insert(src, copy.clone());
        if let Some(dst) = copy.as_obj()
            && !matches!(self.table.repo(index).shape, Shape::Bytes)
        {
            self.queue.push_back((src, dst, index));
        }
        Ok(copy)
    }

    fn populate_all(&mut self) {
        while let Some((src, dst, index)) = self.queue.pop_front() {
            if let Err(e) = self.populate(src, dst, index) {
                let path = self.table.repo(index).schema.path();
                log::warn!("cannot clone an object of `{path}`: {e}");
            }
        }
    }

    fn populate(&mut self, src: ObjRef, dst: ObjRef, index: u16) -> Result<()> {
        match self.table.repo(index).shape {
            Shape::Array => {
                for i in 0..self.heap.array(src)?.len() {
                    let item = self.heap.array(src)?[i].clone();
                    let copy = self.clone_value(&item)?;
                    self.heap.array_mut(dst)?[i] = copy;
                }
            }
            Shape::List => {
                for i in 0..self.heap.list(src)?.len() {
                    let item = self.heap.list(src)?[i].clone();
                    let copy = self.clone_value(&item)?;
                    self.heap.list_mut(dst)?.push(copy);
                }
            }
            Shape::Set => {
                let items: Vec<Value> = self.heap.set(src)?.iter().cloned().collect();
                for item in &items {
                    let copy = self.clone_value(item)?;
                    self.heap.set_mut(dst)?.insert(copy);
                }
            }
            Shape::Map => {
                let entries: Vec<(Value, Value)> = self
                    .heap
                    .map(src)?
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                for (key, value) in &entries {
                    let key = self.clone_value(key)?;
                    let value = self.clone_value(value)?;
                    if key.is_null() {
                        log::warn!("dropping a map entry whose key clones to null");
                        continue;
                    }
                    self.heap.map_mut(dst)?.insert(key, value);
                }
            }
            Shape::Object => {
                let slots: Vec<usize> = self
                    .table
                    .repo(index)
                    .schema
                    .members
                    .iter()
                    .filter_map(|member| member.slot)
                    .collect();
                for slot in slots {
                    let value = member_value(self.cx.registry, self.heap, src, slot)?;
                    let copy = self.clone_value(&value)?;
                    self.heap.set_slot(dst, slot, Slot::Loaded(copy))?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
